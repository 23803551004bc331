//! Info command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::InfoArgs;
use crate::io::{metadata_path, ModelMetadata};

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let path = metadata_path(&args.model_path);
    let meta = ModelMetadata::load(&path).map_err(|e| format!("Metadata error: {e}"))?;

    if args.json {
        let json = serde_json::to_string_pretty(&meta).map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    log(level, LogLevel::Normal, &format!("Model info: {}", path.display()));
    println!("Model type: {}", meta.model_type);
    println!("Version: {}", meta.version);
    println!("Input size: {}", meta.input_size);
    println!("Epochs: {}", meta.train_history.epochs);
    if let Some(loss) = meta.train_history.final_train_loss {
        println!("Final train loss: {loss:.6}");
    }
    if let Some(loss) = meta.train_history.final_val_loss {
        println!("Final val loss: {loss:.6}");
    }
    println!("Exported at: {}", meta.exported_at.to_rfc3339());
    println!("Device: {}", meta.device);
    Ok(())
}
