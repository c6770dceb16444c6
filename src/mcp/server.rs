//! PCM MCP Server Implementation
//!
//! Implements the MCP server with all PCM tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{
    MaterialCategory, MaterialCreate, MaterialId, PackageUnit, ProductCreate, RecipeItem,
};
use crate::tools::catalog;
use crate::tools::materials;
use crate::tools::products;
use crate::tools::search;
use crate::tools::status::StatusTracker;

/// PCM MCP Service
#[derive(Clone)]
pub struct PcmService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<PcmService>,
    /// Page size used when loading the full material catalog
    page_size: i64,
}

impl PcmService {
    pub fn new(database_path: PathBuf, database: Database, page_size: i64) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
            page_size,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Catalog Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchCatalogParams {
    /// Keyword matched against product and material names
    pub keyword: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportCatalogParams {
    /// Path to a JSON export with "materials" and "products" arrays
    pub file_path: String,
}

// ============================================================================
// Material Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddMaterialParams {
    /// Catalog id used by recipes to reference this material
    pub dk_id: i64,
    pub name: String,
    /// Category: material or packaging (default material)
    #[serde(default = "default_category")]
    pub category: String,
    /// Package amount in package_unit
    pub package_amount: f64,
    /// Package unit: g, ml, or piece
    pub package_unit: String,
    /// Price of one package
    pub package_price: f64,
}

fn default_category() -> String { "material".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetMaterialParams {
    /// Catalog id (dk_id) of the material
    pub dk_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMaterialsParams {
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

// ============================================================================
// Product Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeLineParams {
    /// Catalog id of the material; omit for an unlinked line
    pub material_dk_id: Option<i64>,
    /// Quantity in the material's package unit
    pub quantity: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddProductParams {
    pub name: String,
    /// Regular selling price (optional)
    pub price_normal: Option<f64>,
    /// Promotional selling price (optional)
    pub price_special: Option<f64>,
    /// Ordered recipe lines; omit for a product without a recipe
    pub recipe: Option<Vec<RecipeLineParams>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProductIdParams {
    /// Product ID
    pub id: i64,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl PcmService {
    // --- Status ---

    #[tool(description = "Get the current status of the PCM service including build info, database status, and process information")]
    async fn pcm_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status())
    }

    #[tool(description = "Get instructions for looking up product costs. Call this when unsure how costs are computed or how to read a cost breakdown.")]
    fn cost_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::COST_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(COST_INSTRUCTIONS)]))
    }

    // --- Catalog ---

    #[tool(description = "Search products and materials by name. Each product hit includes its total cost computed against the full material catalog.")]
    fn search_catalog(&self, Parameters(p): Parameters<SearchCatalogParams>) -> Result<CallToolResult, McpError> {
        let result = search::search_catalog(&self.database, &p.keyword, self.page_size)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Import a JSON catalog export of materials and products. Invalid records are skipped and reported.")]
    fn import_catalog(&self, Parameters(p): Parameters<ImportCatalogParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::import_catalog_file(&self.database, &p.file_path)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Materials ---

    #[tool(description = "Add a material with its package amount, unit, and price")]
    fn add_material(&self, Parameters(p): Parameters<AddMaterialParams>) -> Result<CallToolResult, McpError> {
        let category = MaterialCategory::from_str(&p.category).ok_or_else(|| {
            McpError::invalid_params(format!("Invalid category '{}': expected material or packaging", p.category), None)
        })?;
        let package_unit = PackageUnit::from_str(&p.package_unit).ok_or_else(|| {
            McpError::invalid_params(format!("Invalid package_unit '{}': expected g, ml, or piece", p.package_unit), None)
        })?;

        let data = MaterialCreate {
            dk_id: Some(MaterialId(p.dk_id)),
            name: p.name,
            category,
            package_amount: p.package_amount,
            package_unit,
            package_price: p.package_price,
        };
        let result = materials::add_material(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a material by catalog id, including its unit price and how many products use it")]
    fn get_material(&self, Parameters(p): Parameters<GetMaterialParams>) -> Result<CallToolResult, McpError> {
        let result = materials::get_material(&self.database, p.dk_id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(material) => serde_json::to_string_pretty(&material),
            None => Ok(format!(r#"{{"error": "Material not found", "dk_id": {}}}"#, p.dk_id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List materials with pagination")]
    fn list_materials(&self, Parameters(p): Parameters<ListMaterialsParams>) -> Result<CallToolResult, McpError> {
        let result = materials::list_materials(&self.database, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Products ---

    #[tool(description = "Add a product with an ordered recipe of (material_dk_id, quantity) lines")]
    fn add_product(&self, Parameters(p): Parameters<AddProductParams>) -> Result<CallToolResult, McpError> {
        let recipe = p.recipe.map(|lines| {
            lines
                .into_iter()
                .map(|line| RecipeItem {
                    material_id: line.material_dk_id.map(MaterialId),
                    quantity: line.quantity,
                })
                .collect()
        });
        let data = ProductCreate {
            name: p.name,
            price_normal: p.price_normal,
            price_special: p.price_special,
            recipe,
        };
        let result = products::add_product(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the itemized cost breakdown of a product. unresolved_lines counts recipe lines left out of total_cost.")]
    fn get_product_cost(&self, Parameters(p): Parameters<ProductIdParams>) -> Result<CallToolResult, McpError> {
        let result = products::get_product_cost(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(cost) => serde_json::to_string_pretty(&cost),
            None => Ok(format!(r#"{{"error": "Product not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a product and its recipe")]
    fn delete_product(&self, Parameters(p): Parameters<ProductIdParams>) -> Result<CallToolResult, McpError> {
        let result = products::delete_product(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for PcmService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "pcm".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Product Cost Manager".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Product Cost Manager (PCM) - Material catalog search and recipe cost breakdown. \
                 IMPORTANT: Call cost_instructions before interpreting costs. \
                 Search: search_catalog (products with total_cost, plus materials). \
                 Products: add_product, get_product_cost, delete_product. \
                 Materials: add_material, get_material, list_materials. \
                 Bulk load: import_catalog."
                    .into(),
            ),
        }
    }
}
