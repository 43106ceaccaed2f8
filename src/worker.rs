// src/worker.rs
use crate::config::HotlineConfig;
use crate::error::{SoapError, WorkerError};
use crate::soap::SoapClient;
use amiquip::{
    Channel, Connection, ConsumerMessage, ConsumerOptions, Delivery, QueueDeclareOptions,
};
use std::io::Write;

pub const TICKET_OPERATION: &str = "TicketCreate";
pub const TICKET_PARAMETER: &str = "TicketJSON";

/// Remote side of the worker: one call per queue message
pub trait TicketService {
    fn create_ticket(&self, ticket_json: &str) -> Result<String, SoapError>;
}

impl TicketService for SoapClient {
    fn create_ticket(&self, ticket_json: &str) -> Result<String, SoapError> {
        self.call(TICKET_OPERATION, TICKET_PARAMETER, ticket_json)
    }
}

/// A queue delivering one message at a time
pub trait MessageQueue {
    type Message;

    /// Next message, or `None` once the consumer has been cancelled
    fn receive(&mut self) -> Result<Option<Self::Message>, WorkerError>;
    fn body<'m>(&self, message: &'m Self::Message) -> &'m [u8];
    fn ack(&mut self, message: Self::Message) -> Result<(), WorkerError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    pub received: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct TicketWorker<S: TicketService> {
    service: S,
}

impl<S: TicketService> TicketWorker<S> {
    pub fn new(service: S) -> Self {
        TicketWorker { service }
    }

    /// Consume until the queue closes. Every message is acknowledged after
    /// its call returns, whether or not the call succeeded.
    pub fn run<Q: MessageQueue, W: Write>(
        &self,
        queue: &mut Q,
        console: &mut W,
    ) -> Result<WorkerStats, WorkerError> {
        let mut stats = WorkerStats::default();
        let io_err = |e: std::io::Error| WorkerError::Queue(format!("console write failed: {e}"));

        while let Some(message) = queue.receive()? {
            stats.received += 1;
            let body = String::from_utf8_lossy(queue.body(&message)).into_owned();
            writeln!(console, " [x] Received {:?}\n [x] Sending request", body).map_err(io_err)?;

            match self.service.create_ticket(&body) {
                Ok(response) => {
                    stats.succeeded += 1;
                    writeln!(console, " [x] Got response: {:?}", response).map_err(io_err)?;
                }
                Err(err) => {
                    stats.failed += 1;
                    tracing::error!("{} failed: {}", TICKET_OPERATION, err);
                    writeln!(console, " [x] Request failed: {}", err).map_err(io_err)?;
                }
            }

            queue.ack(message)?;
            writeln!(console, " [x] Done").map_err(io_err)?;
            console.flush().map_err(io_err)?;
        }

        tracing::info!("Consumer closed after {} messages", stats.received);
        Ok(stats)
    }
}

/// RabbitMQ consumer with prefetch 1
pub struct AmqpQueue<'c> {
    consumer: amiquip::Consumer<'c>,
}

impl<'c> AmqpQueue<'c> {
    /// Declare the durable queue on `channel` and start consuming it.
    pub fn declare(channel: &'c Channel, queue_name: &str) -> Result<Self, WorkerError> {
        channel.qos(0, 1, false)?;
        let queue = channel.queue_declare(
            queue_name,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
        )?;
        let consumer = queue.consume(ConsumerOptions::default())?;
        Ok(AmqpQueue { consumer })
    }
}

impl MessageQueue for AmqpQueue<'_> {
    type Message = Delivery;

    fn receive(&mut self) -> Result<Option<Delivery>, WorkerError> {
        Ok(next_delivery(self.consumer.receiver().recv().ok()))
    }

    fn body<'m>(&self, message: &'m Delivery) -> &'m [u8] {
        &message.body
    }

    fn ack(&mut self, message: Delivery) -> Result<(), WorkerError> {
        self.consumer.ack(message)?;
        Ok(())
    }
}

/// `None` ends consumption. `message` is `None` when the consumer channel
/// itself disconnected.
fn next_delivery(message: Option<ConsumerMessage>) -> Option<Delivery> {
    match message {
        Some(ConsumerMessage::Delivery(delivery)) => Some(delivery),
        Some(_) => {
            tracing::warn!("Consumer cancelled or channel closed");
            None
        }
        None => {
            tracing::warn!("Consumer channel disconnected, broker connection lost");
            None
        }
    }
}

/// Connect to the broker and run the worker until the consumer stops.
pub fn consume_tickets<S: TicketService, W: Write>(
    config: &HotlineConfig,
    worker: &TicketWorker<S>,
    console: &mut W,
) -> Result<WorkerStats, WorkerError> {
    let mut connection = Connection::insecure_open(&config.amqp_url)?;
    let channel = connection.open_channel(None)?;
    let mut queue = AmqpQueue::declare(&channel, &config.queue_name)?;

    writeln!(console, " [*] Waiting for messages. To exit press CTRL+C")
        .and_then(|_| console.flush())
        .map_err(|e| WorkerError::Queue(format!("console write failed: {e}")))?;

    let stats = worker.run(&mut queue, console)?;
    drop(queue);
    connection.close()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct MemoryQueue {
        pending: VecDeque<(u64, Vec<u8>)>,
        acked: Vec<u64>,
    }

    impl MessageQueue for MemoryQueue {
        type Message = (u64, Vec<u8>);

        fn receive(&mut self) -> Result<Option<Self::Message>, WorkerError> {
            Ok(self.pending.pop_front())
        }

        fn body<'m>(&self, message: &'m Self::Message) -> &'m [u8] {
            &message.1
        }

        fn ack(&mut self, message: Self::Message) -> Result<(), WorkerError> {
            self.acked.push(message.0);
            Ok(())
        }
    }

    struct FlakyService {
        calls: RefCell<Vec<String>>,
    }

    impl TicketService for FlakyService {
        fn create_ticket(&self, ticket_json: &str) -> Result<String, SoapError> {
            self.calls.borrow_mut().push(ticket_json.to_string());
            if ticket_json.contains("broken") {
                Err(SoapError::Fault("rejected".to_string()))
            } else {
                Ok("ticket 1".to_string())
            }
        }
    }

    #[test]
    fn test_every_message_is_acked() {
        let mut queue = MemoryQueue {
            pending: VecDeque::from(vec![
                (1, br#"{"Title":"ok"}"#.to_vec()),
                (2, br#"{"Title":"broken"}"#.to_vec()),
                (3, br#"{"Title":"ok again"}"#.to_vec()),
            ]),
            acked: Vec::new(),
        };
        let worker = TicketWorker::new(FlakyService {
            calls: RefCell::new(Vec::new()),
        });
        let mut console = Vec::new();

        let stats = worker.run(&mut queue, &mut console).unwrap();

        assert_eq!(queue.acked, vec![1, 2, 3]);
        assert_eq!(stats.received, 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(worker.service.calls.borrow()[1], r#"{"Title":"broken"}"#);

        let output = String::from_utf8(console).unwrap();
        assert!(output.contains(" [x] Request failed: SOAP fault: rejected"));
        assert_eq!(output.matches(" [x] Done").count(), 3);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured_warnings(f: impl FnOnce()) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = log.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_broker_drop_is_logged_apart_from_cancel() {
        let dropped = captured_warnings(|| assert!(next_delivery(None).is_none()));
        assert!(dropped.contains("Consumer channel disconnected, broker connection lost"));

        let cancelled = captured_warnings(|| {
            assert!(next_delivery(Some(ConsumerMessage::ClientCancelled)).is_none())
        });
        assert!(cancelled.contains("Consumer cancelled or channel closed"));
        assert!(!cancelled.contains("broker connection lost"));
    }
}
