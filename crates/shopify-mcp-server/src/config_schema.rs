//! Print the JSON schema of the server's YAML config file

#[allow(dead_code)]
mod runtime;

fn main() -> anyhow::Result<()> {
    let schema = schemars::schema_for!(runtime::Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
