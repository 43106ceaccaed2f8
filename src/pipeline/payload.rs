// src/pipeline/payload.rs
use crate::pipeline::extract::{ClientFields, EmployeeRecord};
use serde::Serialize;

/// Body of the company endpoint request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyPayload {
    #[serde(rename = "CustomerCompany")]
    pub company: CustomerCompany,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerCompany {
    #[serde(rename = "CustomerCompanyName")]
    pub name: String,
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    #[serde(rename = "CustomerCompanyID")]
    pub company_id: String,
    #[serde(rename = "ValidID")]
    pub valid_id: String,
    #[serde(rename = "Comment")]
    pub comment: String,
    #[serde(rename = "DynamicFields")]
    pub dynamic_fields: CompanyDynamicFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDynamicFields {
    #[serde(rename = "CustomerCompanyFullName")]
    pub full_name: String,
    #[serde(rename = "CustomerCompanyINN")]
    pub inn: String,
    #[serde(rename = "MaintainedBases")]
    pub maintained_bases: Vec<String>,
}

impl CompanyPayload {
    pub fn new(client: &ClientFields, maintained_bases: Vec<String>) -> Self {
        CompanyPayload {
            company: CustomerCompany {
                name: client.name.clone(),
                customer_id: client.to.clone(),
                company_id: client.to.clone(),
                valid_id: valid_flag(client.active).to_string(),
                comment: client.comment.clone(),
                dynamic_fields: CompanyDynamicFields {
                    full_name: client.full_name.clone(),
                    inn: client.inn.clone(),
                    maintained_bases,
                },
            },
        }
    }
}

/// Body of the user endpoint request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPayload {
    #[serde(rename = "CustomerUser")]
    pub user: CustomerUser,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerUser {
    #[serde(rename = "UserCustomerID")]
    pub customer_id: String,
    #[serde(rename = "UserLogin")]
    pub login: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "UserFirstname")]
    pub first_name: String,
    #[serde(rename = "UserLastname")]
    pub last_name: String,
    #[serde(rename = "UserEmail")]
    pub email: String,
    #[serde(rename = "ValidID")]
    pub valid_id: String,
}

impl UserPayload {
    /// Employees are always created valid; login and ID are the full name.
    pub fn new(client_id: &str, employee: &EmployeeRecord) -> Self {
        UserPayload {
            user: CustomerUser {
                customer_id: client_id.to_string(),
                login: employee.full_name.clone(),
                id: employee.full_name.clone(),
                first_name: employee.first_name.clone(),
                last_name: employee.last_name.clone(),
                email: employee.email.clone(),
                valid_id: valid_flag(true).to_string(),
            },
        }
    }
}

fn valid_flag(active: bool) -> &'static str {
    if active {
        "1"
    } else {
        "0"
    }
}
