//! Print the availability API's OpenAPI document as JSON.

use meetings_backend::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), serde_json::Error> {
    let document = ApiDoc::openapi().to_pretty_json()?;
    println!("{document}");
    Ok(())
}
