//! Model management commands.

use anyhow::{Context, Result};
use dashboard_config::AppConfig;
use dashboard_core::types::{validate_model_file, ModelConfig, ModelSummary, TrainingConfig};
use tracing::info;

use crate::cli::{ModelsCommand, OutputFormat};

pub async fn run(command: ModelsCommand, config: &AppConfig) -> Result<()> {
    let client = super::client(config)?;

    match command {
        ModelsCommand::List { output } => {
            let models = client.list_models().await?;
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&models)?),
                OutputFormat::Text => print_models(&models),
            }
        }
        ModelsCommand::Show { name } => {
            let model = client.get_model(&name).await?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
        ModelsCommand::Create { file, name } => {
            let mut model: ModelConfig = super::read_json(&file)?;
            if name.is_some() {
                model.name = name;
            }
            model.validate()?;
            info!("Creating model with {} layers from {:?}", model.layers.len(), file);
            let ack = client.create_model(&model).await?;
            println!("{}", ack.describe());
        }
        ModelsCommand::Upload { file } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("Invalid model file path {}", file.display()))?;
            validate_model_file(file_name)?;
            let contents = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            info!("Uploading {} ({} bytes)", file.display(), contents.len());
            let ack = client.upload_model(file_name, contents).await?;
            println!("{}", ack.describe());
        }
        ModelsCommand::Delete { name } => {
            let ack = client.delete_model(&name).await?;
            println!("{}", ack.describe());
        }
        ModelsCommand::Train {
            name,
            epochs,
            batch_size,
            learning_rate,
        } => {
            let training = TrainingConfig {
                epochs,
                batch_size,
                learning_rate,
            };
            let ack = client.train_model(&name, &training).await?;
            println!("{}", ack.describe());
        }
    }

    Ok(())
}

fn print_models(models: &[ModelSummary]) {
    if models.is_empty() {
        println!("No models.");
        return;
    }

    println!("{:<32} {:<22} {}", "NAME", "CREATED", "STATUS");
    for model in models {
        println!(
            "{:<32} {:<22} {}",
            model.name,
            model.created_at.as_deref().unwrap_or("-"),
            model.status.as_deref().unwrap_or("-")
        );
    }
}
