use anyhow::Result;

fn main() -> Result<()> {
    let schema = excalidraw_shell::Config::json_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
