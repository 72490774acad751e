use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ShopifyTool;
use super::common::{MailingAddress, MetafieldInput, Money, MoneyBag, default_limit};
use crate::errors::{ErrorContext, ToolError, TransportError};
use crate::graphql::{Connection, InContext, PageInfo, Requester, UserError, Variables, send};

/// The order selection shared by every order tool
macro_rules! order_fragment {
    () => {
        r#"
        fragment OrderFields on Order {
          id
          name
          createdAt
          displayFinancialStatus
          displayFulfillmentStatus
          totalPriceSet { shopMoney { amount currencyCode } }
          subtotalPriceSet { shopMoney { amount currencyCode } }
          totalShippingPriceSet { shopMoney { amount currencyCode } }
          totalTaxSet { shopMoney { amount currencyCode } }
          customer {
            id
            firstName
            lastName
            email
          }
          shippingAddress {
            address1
            address2
            city
            provinceCode
            zip
            country
            phone
          }
          lineItems(first: 10) {
            edges {
              node {
                id
                title
                quantity
                originalTotalSet { shopMoney { amount currencyCode } }
                variant {
                  id
                  title
                  sku
                }
              }
            }
          }
          customAttributes { key value }
          tags
          note
          email
        }
        "#
    };
}

const GET_ORDERS: &str = concat!(
    r#"
    query GetOrders($first: Int, $last: Int, $after: String, $before: String, $query: String) {
      orders(first: $first, last: $last, after: $after, before: $before, query: $query) {
        edges {
          node { ...OrderFields }
        }
        pageInfo {
          hasNextPage
          hasPreviousPage
          startCursor
          endCursor
        }
      }
    }
    "#,
    order_fragment!()
);

const GET_ORDER_BY_ID: &str = concat!(
    r#"
    query GetOrderById($id: ID!) {
      order(id: $id) { ...OrderFields }
    }
    "#,
    order_fragment!()
);

const ORDER_UPDATE: &str = concat!(
    r#"
    mutation orderUpdate($input: OrderInput!) {
      orderUpdate(input: $input) {
        order { ...OrderFields }
        userErrors { field message }
      }
    }
    "#,
    order_fragment!()
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemVariant {
    pub id: String,
    pub title: String,
    pub sku: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemNode {
    id: String,
    title: String,
    quantity: i64,
    original_total_set: MoneyBag,
    variant: Option<LineItemVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub quantity: i64,
    pub original_total: Money,
    pub variant: Option<LineItemVariant>,
}

impl From<LineItemNode> for LineItem {
    fn from(node: LineItemNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            quantity: node.quantity,
            original_total: node.original_total_set.shop_money,
            variant: node.variant,
        }
    }
}

/// A key/value attribute attached to an order at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderNode {
    id: String,
    name: String,
    created_at: String,
    display_financial_status: Option<String>,
    display_fulfillment_status: String,
    total_price_set: MoneyBag,
    subtotal_price_set: Option<MoneyBag>,
    total_shipping_price_set: MoneyBag,
    total_tax_set: Option<MoneyBag>,
    customer: Option<OrderCustomer>,
    shipping_address: Option<MailingAddress>,
    line_items: Connection<LineItemNode>,
    #[serde(default)]
    custom_attributes: Vec<Attribute>,
    tags: Vec<String>,
    note: Option<String>,
    email: Option<String>,
}

/// An order with its money sets flattened to shop-currency amounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub financial_status: Option<String>,
    pub fulfillment_status: String,
    pub total_price: Money,
    pub subtotal_price: Option<Money>,
    pub total_shipping_price: Money,
    pub total_tax: Option<Money>,
    pub customer: Option<OrderCustomer>,
    pub shipping_address: Option<MailingAddress>,
    pub line_items: Vec<LineItem>,
    pub custom_attributes: Vec<Attribute>,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub email: Option<String>,
}

impl From<OrderNode> for Order {
    fn from(node: OrderNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            created_at: node.created_at,
            financial_status: node.display_financial_status,
            fulfillment_status: node.display_fulfillment_status,
            total_price: node.total_price_set.shop_money,
            subtotal_price: node.subtotal_price_set.map(|set| set.shop_money),
            total_shipping_price: node.total_shipping_price_set.shop_money,
            total_tax: node.total_tax_set.map(|set| set.shop_money),
            customer: node.customer,
            shipping_address: node.shipping_address,
            line_items: node
                .line_items
                .into_nodes()
                .into_iter()
                .map(LineItem::from)
                .collect(),
            custom_attributes: node.custom_attributes,
            tags: node.tags,
            note: node.note,
            email: node.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrdersData {
    orders: Connection<OrderNode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersOutput {
    pub orders: Vec<Order>,
    pub page_info: Option<PageInfo>,
}

impl From<OrdersData> for OrdersOutput {
    fn from(data: OrdersData) -> Self {
        let (orders, page_info) = data.orders.into_page();
        Self {
            orders: orders.into_iter().map(Order::from).collect(),
            page_info,
        }
    }
}

// get-orders

/// List orders, optionally filtered by status
pub struct GetOrders;

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Any,
    Open,
    Closed,
    Cancelled,
}

impl OrderStatus {
    /// The search filter for this status; `any` applies none
    fn filter(self) -> Option<&'static str> {
        match self {
            OrderStatus::Any => None,
            OrderStatus::Open => Some("status:open"),
            OrderStatus::Closed => Some("status:closed"),
            OrderStatus::Cancelled => Some("status:cancelled"),
        }
    }
}

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetOrdersInput {
    /// Only return orders with this status (default: any)
    #[serde(default)]
    status: OrderStatus,

    /// Maximum number of orders to return (default: 10)
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 250))]
    limit: u32,

    /// Return orders after this cursor
    after: Option<String>,

    /// Return orders before this cursor
    before: Option<String>,
}

impl ShopifyTool for GetOrders {
    const NAME: &'static str = "get-orders";
    const DESCRIPTION: &'static str = "Get orders with optional filtering by status";

    type Input = GetOrdersInput;
    type Output = OrdersOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetOrdersInput,
    ) -> Result<OrdersOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("orders");

        let variables = Variables::new()
            .page(input.limit, input.after.as_deref(), input.before.as_deref())
            .set_opt("query", input.status.filter())
            .into_value();
        let data: OrdersData = send(client, GET_ORDERS, variables)
            .await
            .in_context(CONTEXT)?;

        Ok(data.into())
    }
}

// get-customer-orders

/// List the orders placed by one customer
pub struct GetCustomerOrders;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetCustomerOrdersInput {
    /// The numeric ID of the customer (e.g., "6276879810626")
    #[schemars(regex(pattern = r"^\d+$"))]
    customer_id: String,

    /// Maximum number of orders to return (default: 10)
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 250))]
    limit: u32,

    /// Return orders after this cursor
    after: Option<String>,

    /// Return orders before this cursor
    before: Option<String>,
}

impl ShopifyTool for GetCustomerOrders {
    const NAME: &'static str = "get-customer-orders";
    const DESCRIPTION: &'static str = "Get orders for a specific customer";

    type Input = GetCustomerOrdersInput;
    type Output = OrdersOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetCustomerOrdersInput,
    ) -> Result<OrdersOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("customer orders");

        let variables = Variables::new()
            .page(input.limit, input.after.as_deref(), input.before.as_deref())
            .set("query", format!("customer_id:{}", input.customer_id))
            .into_value();
        let data: OrdersData = send(client, GET_ORDERS, variables)
            .await
            .in_context(CONTEXT)?;

        Ok(data.into())
    }
}

// get-order-by-id

/// Fetch one order
pub struct GetOrderById;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetOrderByIdInput {
    /// The GID of the order (e.g., "gid://shopify/Order/1234567890")
    #[schemars(length(min = 1))]
    order_id: String,
}

#[derive(Debug, Deserialize)]
struct OrderData {
    order: Option<OrderNode>,
}

#[derive(Debug, Serialize)]
pub struct OrderOutput {
    pub order: Order,
}

impl ShopifyTool for GetOrderById {
    const NAME: &'static str = "get-order-by-id";
    const DESCRIPTION: &'static str = "Get a specific order by ID";

    type Input = GetOrderByIdInput;
    type Output = OrderOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetOrderByIdInput,
    ) -> Result<OrderOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("order");

        let variables = Variables::new()
            .set("id", input.order_id.as_str())
            .into_value();
        let data: OrderData = send(client, GET_ORDER_BY_ID, variables)
            .await
            .in_context(CONTEXT)?;

        let order = data
            .order
            .ok_or_else(|| CONTEXT.not_found("Order", input.order_id))?;
        Ok(OrderOutput {
            order: order.into(),
        })
    }
}

// update-order

/// Update an order's tags, contact email, note, attributes and shipping address
pub struct UpdateOrder;

#[derive(JsonSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zip: Option<String>,
}

/// A custom attribute to set on an order
#[derive(JsonSchema, Serialize, Deserialize, Debug)]
pub struct AttributeInput {
    key: String,
    value: String,
}

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderInput {
    /// The GID of the order to update (e.g., "gid://shopify/Order/1234567890")
    #[schemars(length(min = 1))]
    id: String,
    /// Replacement tags for the order
    tags: Option<Vec<String>>,
    /// The order's contact email
    #[schemars(regex(pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$"))]
    email: Option<String>,
    /// The order's note
    note: Option<String>,
    /// Replacement custom attributes
    custom_attributes: Option<Vec<AttributeInput>>,
    /// Metafields to set on the order
    metafields: Option<Vec<MetafieldInput>>,
    /// The new shipping address
    shipping_address: Option<ShippingAddressInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderInput<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_attributes: Option<&'a [AttributeInput]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metafields: Option<&'a [MetafieldInput]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_address: Option<&'a ShippingAddressInput>,
}

impl<'a> From<&'a UpdateOrderInput> for OrderInput<'a> {
    fn from(input: &'a UpdateOrderInput) -> Self {
        Self {
            id: &input.id,
            tags: input.tags.as_deref(),
            email: input.email.as_deref(),
            note: input.note.as_deref(),
            custom_attributes: input.custom_attributes.as_deref(),
            metafields: input.metafields.as_deref(),
            shipping_address: input.shipping_address.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderUpdateData {
    order_update: OrderUpdatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderUpdatePayload {
    order: Option<OrderNode>,
    user_errors: Vec<UserError>,
}

impl ShopifyTool for UpdateOrder {
    const NAME: &'static str = "update-order";
    const DESCRIPTION: &'static str = "Update an existing order with new information";

    type Input = UpdateOrderInput;
    type Output = OrderOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: UpdateOrderInput,
    ) -> Result<OrderOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::update("order");

        let variables = Variables::new()
            .set_serialized("input", &OrderInput::from(&input))
            .in_context(CONTEXT)?
            .into_value();
        let data: OrderUpdateData = send(client, ORDER_UPDATE, variables)
            .await
            .in_context(CONTEXT)?;
        CONTEXT.reject_user_errors(data.order_update.user_errors)?;

        let order = data
            .order_update
            .order
            .ok_or_else(|| CONTEXT.transport(TransportError::MissingData))?;
        Ok(OrderOutput {
            order: order.into(),
        })
    }
}
