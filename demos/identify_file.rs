use snake_identifier::{OpenRouterClient, ServiceConfig, SnakeIdentifier};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let image_path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: identify_file <image_path>");
        std::process::exit(1);
    });

    let media_type = match Path::new(&image_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };

    let config = ServiceConfig::from_env()?;
    let identifier = SnakeIdentifier::new(OpenRouterClient::new(config.openrouter));

    println!("Identifying {} ({})...", image_path, media_type);

    let image = std::fs::read(&image_path)?;
    let record = identifier.identify(&image, media_type).await?;

    println!("{}", record);

    Ok(())
}
