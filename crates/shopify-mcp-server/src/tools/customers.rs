use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ShopifyTool;
use super::common::{MailingAddress, MetafieldInput, Money, default_limit};
use crate::errors::{ErrorContext, ToolError, TransportError};
use crate::graphql::{Connection, InContext, PageInfo, Requester, UserError, Variables, send};

const GET_CUSTOMERS: &str = r#"
    query GetCustomers($first: Int, $last: Int, $after: String, $before: String, $query: String) {
      customers(first: $first, last: $last, after: $after, before: $before, query: $query) {
        edges {
          node {
            id
            firstName
            lastName
            email
            phone
            createdAt
            updatedAt
            tags
            defaultAddress {
              address1
              address2
              city
              provinceCode
              zip
              country
              phone
            }
            addresses {
              address1
              address2
              city
              provinceCode
              zip
              country
              phone
            }
            amountSpent {
              amount
              currencyCode
            }
            numberOfOrders
          }
        }
        pageInfo {
          hasNextPage
          hasPreviousPage
          startCursor
          endCursor
        }
      }
    }
"#;

const CUSTOMER_UPDATE: &str = r#"
    mutation customerUpdate($input: CustomerInput!) {
      customerUpdate(input: $input) {
        customer {
          id
          firstName
          lastName
          email
          phone
          tags
          note
          taxExempt
          updatedAt
          metafields(first: 10) {
            edges {
              node { id namespace key value type }
            }
          }
        }
        userErrors { field message }
      }
    }
"#;

/// Build the global identifier of a customer from its numeric ID
fn customer_gid(id: &str) -> String {
    format!("gid://shopify/Customer/{id}")
}

// get-customers

/// List customers, optionally filtered by an Admin API search query
pub struct GetCustomers;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetCustomersInput {
    /// Search query passed to the Admin API as is (e.g., "email:bob@example.com")
    search_query: Option<String>,

    /// Maximum number of customers to return (default: 10)
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 250))]
    limit: u32,

    /// Return customers after this cursor
    after: Option<String>,

    /// Return customers before this cursor
    before: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomersData {
    customers: Connection<Customer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<String>,
    pub default_address: Option<MailingAddress>,
    #[serde(default)]
    pub addresses: Vec<MailingAddress>,
    pub amount_spent: Option<Money>,
    pub number_of_orders: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomersOutput {
    pub customers: Vec<Customer>,
    pub page_info: Option<PageInfo>,
}

impl ShopifyTool for GetCustomers {
    const NAME: &'static str = "get-customers";
    const DESCRIPTION: &'static str = "Get customers or search by name/email";

    type Input = GetCustomersInput;
    type Output = CustomersOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetCustomersInput,
    ) -> Result<CustomersOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("customers");

        let variables = Variables::new()
            .page(input.limit, input.after.as_deref(), input.before.as_deref())
            .set_opt("query", input.search_query)
            .into_value();
        let data: CustomersData = send(client, GET_CUSTOMERS, variables)
            .await
            .in_context(CONTEXT)?;

        let (customers, page_info) = data.customers.into_page();
        Ok(CustomersOutput {
            customers,
            page_info,
        })
    }
}

// update-customer

/// Update a customer's contact details, tags, note and metafields
pub struct UpdateCustomer;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerInput {
    /// The numeric ID of the customer (e.g., "6276879810626")
    #[schemars(regex(pattern = r"^\d+$"))]
    id: String,
    /// The customer's first name
    first_name: Option<String>,
    /// The customer's last name
    last_name: Option<String>,
    /// The customer's email address
    #[schemars(regex(pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$"))]
    email: Option<String>,
    /// The customer's phone number in E.164 format
    phone: Option<String>,
    /// Replacement tags for the customer
    tags: Option<Vec<String>>,
    /// A note about the customer
    note: Option<String>,
    /// Whether the customer is exempt from taxes
    tax_exempt: Option<bool>,
    /// Metafields to set on the customer
    metafields: Option<Vec<MetafieldInput>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerInput<'a> {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tax_exempt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metafields: Option<&'a [MetafieldInput]>,
}

impl<'a> From<&'a UpdateCustomerInput> for CustomerInput<'a> {
    fn from(input: &'a UpdateCustomerInput) -> Self {
        Self {
            id: customer_gid(&input.id),
            first_name: input.first_name.as_deref(),
            last_name: input.last_name.as_deref(),
            email: input.email.as_deref(),
            phone: input.phone.as_deref(),
            tags: input.tags.as_deref(),
            note: input.note.as_deref(),
            tax_exempt: input.tax_exempt,
            metafields: input.metafields.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metafield {
    pub id: String,
    pub namespace: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatedCustomerNode {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    tags: Vec<String>,
    note: Option<String>,
    tax_exempt: bool,
    updated_at: String,
    metafields: Connection<Metafield>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedCustomer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub tax_exempt: bool,
    pub updated_at: String,
    pub metafields: Vec<Metafield>,
}

impl From<UpdatedCustomerNode> for UpdatedCustomer {
    fn from(node: UpdatedCustomerNode) -> Self {
        Self {
            id: node.id,
            first_name: node.first_name,
            last_name: node.last_name,
            email: node.email,
            phone: node.phone,
            tags: node.tags,
            note: node.note,
            tax_exempt: node.tax_exempt,
            updated_at: node.updated_at,
            metafields: node.metafields.into_nodes(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerUpdateData {
    customer_update: CustomerUpdatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerUpdatePayload {
    customer: Option<UpdatedCustomerNode>,
    user_errors: Vec<UserError>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedCustomerOutput {
    pub customer: UpdatedCustomer,
}

impl ShopifyTool for UpdateCustomer {
    const NAME: &'static str = "update-customer";
    const DESCRIPTION: &'static str = "Update a customer's information";

    type Input = UpdateCustomerInput;
    type Output = UpdatedCustomerOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: UpdateCustomerInput,
    ) -> Result<UpdatedCustomerOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::update("customer");

        let variables = Variables::new()
            .set_serialized("input", &CustomerInput::from(&input))
            .in_context(CONTEXT)?
            .into_value();
        let data: CustomerUpdateData = send(client, CUSTOMER_UPDATE, variables)
            .await
            .in_context(CONTEXT)?;
        CONTEXT.reject_user_errors(data.customer_update.user_errors)?;

        let customer = data
            .customer_update
            .customer
            .ok_or_else(|| CONTEXT.transport(TransportError::MissingData))?;
        Ok(UpdatedCustomerOutput {
            customer: customer.into(),
        })
    }
}
