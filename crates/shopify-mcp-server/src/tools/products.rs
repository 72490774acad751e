use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ShopifyTool;
use super::common::{Image, Money, SeoInput, default_limit, title_filter};
use crate::errors::{ErrorContext, ToolError, TransportError};
use crate::graphql::{Connection, InContext, Requester, UserError, Variables, send};

/// Selection shared by the update mutation and the post-update re-fetch, so
/// both paths return the same record.
macro_rules! updated_product_fragment {
    () => {
        r#"
        fragment UpdatedProduct on Product {
          id
          title
          descriptionHtml
          handle
          status
          vendor
          productType
          tags
          updatedAt
          variants(first: 20) {
            edges {
              node {
                id
                title
                price
                compareAtPrice
                barcode
                inventoryQuantity
                sku
              }
            }
          }
        }
        "#
    };
}

const GET_PRODUCTS: &str = r#"
    query GetProducts($first: Int!, $query: String) {
      products(first: $first, query: $query) {
        edges {
          node {
            id
            title
            description
            descriptionHtml
            handle
            status
            createdAt
            updatedAt
            totalInventory
            priceRangeV2 {
              minVariantPrice { amount currencyCode }
              maxVariantPrice { amount currencyCode }
            }
            images(first: 1) {
              edges { node { url altText } }
            }
            variants(first: 5) {
              edges {
                node { id title price inventoryQuantity sku }
              }
            }
          }
        }
      }
    }
"#;

const GET_PRODUCT_BY_ID: &str = r#"
    query GetProductById($id: ID!) {
      product(id: $id) {
        id
        title
        description
        descriptionHtml
        handle
        status
        createdAt
        updatedAt
        totalInventory
        priceRangeV2 {
          minVariantPrice { amount currencyCode }
          maxVariantPrice { amount currencyCode }
        }
        images(first: 5) {
          edges { node { id url altText width height } }
        }
        variants(first: 20) {
          edges {
            node {
              id
              title
              price
              inventoryQuantity
              sku
              selectedOptions { name value }
            }
          }
        }
        collections(first: 5) {
          edges { node { id title } }
        }
        tags
        vendor
      }
    }
"#;

const PRODUCT_UPDATE: &str = concat!(
    r#"
    mutation productUpdate($input: ProductInput!) {
      productUpdate(input: $input) {
        product { ...UpdatedProduct }
        userErrors { field message }
      }
    }
    "#,
    updated_product_fragment!()
);

const PRODUCT_VARIANTS_BULK_UPDATE: &str = r#"
    mutation productVariantsBulkUpdate($productId: ID!, $variants: [ProductVariantsBulkInput!]!) {
      productVariantsBulkUpdate(productId: $productId, variants: $variants) {
        productVariants { id }
        userErrors { field message }
      }
    }
"#;

const GET_UPDATED_PRODUCT: &str = concat!(
    r#"
    query GetUpdatedProduct($id: ID!) {
      product(id: $id) { ...UpdatedProduct }
    }
    "#,
    updated_product_fragment!()
);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRangeV2 {
    min_variant_price: Money,
    max_variant_price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_price: Money,
    pub max_price: Money,
}

impl From<PriceRangeV2> for PriceRange {
    fn from(range: PriceRangeV2) -> Self {
        Self {
            min_price: range.min_variant_price,
            max_price: range.max_variant_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    pub title: String,
    pub price: String,
    pub inventory_quantity: Option<i64>,
    pub sku: Option<String>,
}

// get-products

/// Fetch products, optionally filtered by title
pub struct GetProducts;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetProductsInput {
    /// Optional search term to filter products by title
    search_title: Option<String>,

    /// Maximum number of products to return (default: 10)
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 250))]
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: Connection<ProductListNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductListNode {
    id: String,
    title: String,
    description: String,
    description_html: String,
    handle: String,
    status: String,
    created_at: String,
    updated_at: String,
    total_inventory: Option<i64>,
    price_range_v2: PriceRangeV2,
    images: Connection<Image>,
    variants: Connection<ProductVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub handle: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub total_inventory: Option<i64>,
    pub price_range: PriceRange,
    pub image_url: Option<String>,
    pub variants: Vec<ProductVariant>,
}

impl From<ProductListNode> for ProductSummary {
    fn from(node: ProductListNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            description: node.description,
            description_html: node.description_html,
            handle: node.handle,
            status: node.status,
            created_at: node.created_at,
            updated_at: node.updated_at,
            total_inventory: node.total_inventory,
            price_range: node.price_range_v2.into(),
            image_url: node.images.first().map(|image| image.url),
            variants: node.variants.into_nodes(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductsOutput {
    pub products: Vec<ProductSummary>,
}

impl ShopifyTool for GetProducts {
    const NAME: &'static str = "get-products";
    const DESCRIPTION: &'static str = "Get all products or search by title, including SEO-relevant fields like title and description";

    type Input = GetProductsInput;
    type Output = ProductsOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetProductsInput,
    ) -> Result<ProductsOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("products");

        let variables = Variables::new()
            .set("first", input.limit)
            .set_opt("query", title_filter(input.search_title.as_deref()))
            .into_value();

        let data: ProductsData = send(client, GET_PRODUCTS, variables)
            .await
            .in_context(CONTEXT)?;

        Ok(ProductsOutput {
            products: data
                .products
                .into_nodes()
                .into_iter()
                .map(ProductSummary::from)
                .collect(),
        })
    }
}

// get-product-by-id

/// Fetch one product with its images, variants and collections
pub struct GetProductById;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetProductByIdInput {
    /// The GID of the product to fetch (e.g., "gid://shopify/Product/1234567890")
    #[schemars(length(min = 1))]
    product_id: String,
}

#[derive(Debug, Deserialize)]
struct ProductData {
    product: Option<ProductDetailNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantDetailNode {
    id: String,
    title: String,
    price: String,
    inventory_quantity: Option<i64>,
    sku: Option<String>,
    selected_options: Vec<SelectedOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDetail {
    pub id: String,
    pub title: String,
    pub price: String,
    pub inventory_quantity: Option<i64>,
    pub sku: Option<String>,
    pub options: Vec<SelectedOption>,
}

impl From<VariantDetailNode> for VariantDetail {
    fn from(node: VariantDetailNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            price: node.price,
            inventory_quantity: node.inventory_quantity,
            sku: node.sku,
            options: node.selected_options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: Option<String>,
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDetailNode {
    id: String,
    title: String,
    description: String,
    description_html: String,
    handle: String,
    status: String,
    created_at: String,
    updated_at: String,
    total_inventory: Option<i64>,
    price_range_v2: PriceRangeV2,
    images: Connection<ProductImage>,
    variants: Connection<VariantDetailNode>,
    collections: Connection<CollectionRef>,
    tags: Vec<String>,
    vendor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub handle: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub total_inventory: Option<i64>,
    pub price_range: PriceRange,
    pub images: Vec<ProductImage>,
    pub variants: Vec<VariantDetail>,
    pub collections: Vec<CollectionRef>,
    pub tags: Vec<String>,
    pub vendor: Option<String>,
}

impl From<ProductDetailNode> for ProductDetail {
    fn from(node: ProductDetailNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            description: node.description,
            description_html: node.description_html,
            handle: node.handle,
            status: node.status,
            created_at: node.created_at,
            updated_at: node.updated_at,
            total_inventory: node.total_inventory,
            price_range: node.price_range_v2.into(),
            images: node.images.into_nodes(),
            variants: node
                .variants
                .into_nodes()
                .into_iter()
                .map(VariantDetail::from)
                .collect(),
            collections: node.collections.into_nodes(),
            tags: node.tags,
            vendor: node.vendor,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDetailOutput {
    pub product: ProductDetail,
}

impl ShopifyTool for GetProductById {
    const NAME: &'static str = "get-product-by-id";
    const DESCRIPTION: &'static str =
        "Get a specific product by ID including title, description, and SEO-relevant fields";

    type Input = GetProductByIdInput;
    type Output = ProductDetailOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetProductByIdInput,
    ) -> Result<ProductDetailOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("product");

        let variables = Variables::new()
            .set("id", input.product_id.as_str())
            .into_value();
        let data: ProductData = send(client, GET_PRODUCT_BY_ID, variables)
            .await
            .in_context(CONTEXT)?;

        let product = data
            .product
            .ok_or_else(|| CONTEXT.not_found("Product", input.product_id))?;
        Ok(ProductDetailOutput {
            product: product.into(),
        })
    }
}

// update-product

/// Update a product and, when variant changes are given, its variants
pub struct UpdateProduct;

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductStatus {
    Active,
    Archived,
    Draft,
}

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VariantUpdateInput {
    /// The GID of the variant to update (e.g., "gid://shopify/ProductVariant/1234567890")
    #[schemars(length(min = 1))]
    id: String,
    /// The new price
    price: Option<String>,
    /// The new compare-at price
    compare_at_price: Option<String>,
    /// The new SKU
    sku: Option<String>,
    /// The new barcode (ISBN, UPC, GTIN, etc.)
    barcode: Option<String>,
}

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    /// The GID of the product to update (e.g., "gid://shopify/Product/1234567890")
    #[schemars(length(min = 1))]
    product_id: String,
    /// The new title for the product
    title: Option<String>,
    /// The new HTML description for the product
    description_html: Option<String>,
    /// The new status for the product
    status: Option<ProductStatus>,
    /// The new vendor for the product
    vendor: Option<String>,
    /// The new product type
    product_type: Option<String>,
    /// Replacement tags for the product
    tags: Option<Vec<String>>,
    /// New SEO title and description
    seo: Option<SeoInput>,
    /// Variant changes, applied after the product itself is updated
    variants: Option<Vec<VariantUpdateInput>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductInput<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description_html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<ProductStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seo: Option<&'a SeoInput>,
}

impl<'a> From<&'a UpdateProductInput> for ProductInput<'a> {
    fn from(input: &'a UpdateProductInput) -> Self {
        Self {
            id: &input.product_id,
            title: input.title.as_deref(),
            description_html: input.description_html.as_deref(),
            status: input.status,
            vendor: input.vendor.as_deref(),
            product_type: input.product_type.as_deref(),
            tags: input.tags.as_deref(),
            seo: input.seo.as_ref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct InventoryItemInput<'a> {
    sku: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VariantsBulkInput<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compare_at_price: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    barcode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inventory_item: Option<InventoryItemInput<'a>>,
}

impl<'a> From<&'a VariantUpdateInput> for VariantsBulkInput<'a> {
    fn from(variant: &'a VariantUpdateInput) -> Self {
        Self {
            id: &variant.id,
            price: variant.price.as_deref(),
            compare_at_price: variant.compare_at_price.as_deref(),
            barcode: variant.barcode.as_deref(),
            inventory_item: variant
                .sku
                .as_deref()
                .map(|sku| InventoryItemInput { sku }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedVariant {
    pub id: String,
    pub title: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub barcode: Option<String>,
    pub inventory_quantity: Option<i64>,
    pub sku: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatedProductNode {
    id: String,
    title: String,
    description_html: String,
    handle: String,
    status: String,
    vendor: Option<String>,
    product_type: Option<String>,
    tags: Vec<String>,
    updated_at: String,
    variants: Connection<UpdatedVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedProduct {
    pub id: String,
    pub title: String,
    pub description_html: String,
    pub handle: String,
    pub status: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub tags: Vec<String>,
    pub updated_at: String,
    pub variants: Vec<UpdatedVariant>,
}

impl From<UpdatedProductNode> for UpdatedProduct {
    fn from(node: UpdatedProductNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            description_html: node.description_html,
            handle: node.handle,
            status: node.status,
            vendor: node.vendor,
            product_type: node.product_type,
            tags: node.tags,
            updated_at: node.updated_at,
            variants: node.variants.into_nodes(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductUpdateData {
    product_update: ProductUpdatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductUpdatePayload {
    product: Option<UpdatedProductNode>,
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantsBulkUpdateData {
    product_variants_bulk_update: VariantsBulkUpdatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantsBulkUpdatePayload {
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct UpdatedProductData {
    product: Option<UpdatedProductNode>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedProductOutput {
    pub product: UpdatedProduct,
}

impl ShopifyTool for UpdateProduct {
    const NAME: &'static str = "update-product";
    const DESCRIPTION: &'static str = "Update a product's details including title, description, status, tags and SEO, and optionally its variants' prices, SKUs and barcodes";

    type Input = UpdateProductInput;
    type Output = UpdatedProductOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: UpdateProductInput,
    ) -> Result<UpdatedProductOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::update("product");

        let variables = Variables::new()
            .set_serialized("input", &ProductInput::from(&input))
            .in_context(CONTEXT)?
            .into_value();
        let data: ProductUpdateData = send(client, PRODUCT_UPDATE, variables)
            .await
            .in_context(CONTEXT)?;
        CONTEXT.reject_user_errors(data.product_update.user_errors)?;

        let mut product = data
            .product_update
            .product
            .ok_or_else(|| CONTEXT.transport(TransportError::MissingData))?;

        if let Some(variants) = input.variants.as_deref().filter(|v| !v.is_empty()) {
            debug!(count = variants.len(), "Updating product variants");

            let variants: Vec<VariantsBulkInput> = variants.iter().map(Into::into).collect();
            let variables = Variables::new()
                .set("productId", input.product_id.as_str())
                .set_serialized("variants", &variants)
                .in_context(CONTEXT)?
                .into_value();
            let data: VariantsBulkUpdateData =
                send(client, PRODUCT_VARIANTS_BULK_UPDATE, variables)
                    .await
                    .in_context(CONTEXT)?;
            CONTEXT.reject_user_errors(data.product_variants_bulk_update.user_errors)?;

            // Re-read only after the variant update has committed so the
            // result reflects both steps.
            let variables = Variables::new()
                .set("id", input.product_id.as_str())
                .into_value();
            let data: UpdatedProductData = send(client, GET_UPDATED_PRODUCT, variables)
                .await
                .in_context(CONTEXT)?;
            product = data
                .product
                .ok_or_else(|| CONTEXT.not_found("Product", input.product_id.as_str()))?;
        }

        Ok(UpdatedProductOutput {
            product: product.into(),
        })
    }
}
