use std::path::Path;
use std::process::Command;

use vidverify_media::{check_ffmpeg, check_ffprobe, DEFAULT_OUTPUT_DIR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let output_dir =
        std::env::var("VIDVERIFY_OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string());

    println!("vidverify-selfcheck: starting with output_dir={}", output_dir);
    ensure_output_dir(&output_dir).await?;
    ensure_tool("ffmpeg", check_ffmpeg().is_ok())?;
    ensure_tool("ffprobe", check_ffprobe().is_ok())?;
    ensure_env_present(&["GEMINI_API_KEY"])?;

    println!("vidverify-selfcheck: ok");
    Ok(())
}

async fn ensure_output_dir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;

    let probe = path.join(".vidverify-selfcheck");
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("output dir {} not writable: {}", path.display(), e))?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

fn ensure_tool(name: &str, on_path: bool) -> anyhow::Result<()> {
    if !on_path {
        return Err(anyhow::anyhow!("{} not found in PATH", name));
    }

    let output = Command::new(name)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} not available: {}", name, e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "{} -version failed: {:?}",
            name,
            output.status
        ));
    }
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => {}
            _ => return Err(anyhow::anyhow!("missing required env var {}", var)),
        }
    }
    Ok(())
}
