// Terminal client: connects to an MCP server, lists what it offers and
// optionally calls a tool, reads a resource or renders a prompt.

use anyhow::{Context, Result};
use clap::Parser;
use mcp_explorer::{
    client::{ClientOptions, McpClient},
    config::DiscoverArgs,
    logging,
};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("mcp_explorer=warn");

    let args = DiscoverArgs::parse();
    args.validate()?;
    let arguments: Value = serde_json::from_str(&args.arguments)
        .with_context(|| format!("--arguments is not valid JSON: {}", args.arguments))?;
    if !arguments.is_object() {
        anyhow::bail!("--arguments must be a JSON object");
    }

    let client = McpClient::over_http(
        Some(args.server_url.clone()),
        args.timeout(),
        ClientOptions::default(),
    )?;

    let outcome = client.connect(None).await.context("initialize failed")?;
    println!("Connected to {}", args.server_url);
    if let Some(id) = &outcome.session_id {
        println!("Session: {}", id);
    }
    if let Some(info) = &outcome.server_info {
        println!("Server: {}", info);
    }

    let tools = client.tools().await?;
    println!("\nTools ({}):", tools.len());
    for tool in &tools {
        println!("  - {}: {}", tool.name, tool.description.as_deref().unwrap_or(""));
        let params = tool.parameter_summary();
        if !params.is_empty() {
            println!("      params: {}", params.join(", "));
        }
    }

    // Servers without resources or prompts answer these with an error; keep going.
    match client.resources().await {
        Ok(resources) => {
            println!("\nResources ({}):", resources.len());
            for resource in &resources {
                println!("  - {} ({})", resource.name, resource.uri);
            }
        }
        Err(e) => println!("\nResources unavailable: {}", e),
    }

    match client.prompts().await {
        Ok(prompts) => {
            println!("\nPrompts ({}):", prompts.len());
            for prompt in &prompts {
                let names: Vec<&str> = prompt
                    .arguments
                    .iter()
                    .flatten()
                    .map(|arg| arg.name.as_str())
                    .collect();
                println!("  - {}({})", prompt.name, names.join(", "));
            }
        }
        Err(e) => println!("\nPrompts unavailable: {}", e),
    }

    if let Some(name) = &args.call {
        let result = client.call_tool_typed(name, arguments.clone()).await?;
        println!("\nCall {} {}:", name, arguments);
        if result.is_error {
            println!("  (tool reported an error)");
        }
        for block in &result.content {
            println!("  {}", block.describe());
        }
        if let Some(structured) = &result.structured_content {
            println!("  structured: {}", structured);
        }
    }

    if let Some(uri) = &args.read {
        let result = client.read_resource_typed(uri).await?;
        println!("\nRead {}:", uri);
        for contents in &result.contents {
            match (&contents.text, &contents.blob) {
                (Some(text), _) => println!("{}", text),
                (None, Some(blob)) => println!("  [blob {} base64 chars]", blob.len()),
                (None, None) => println!("  [empty {}]", contents.uri),
            }
        }
    }

    if let Some(name) = &args.prompt {
        let result = client.get_prompt_typed(name, arguments).await?;
        println!("\nPrompt {}:", name);
        for message in &result.messages {
            println!("[{:?}]\n{}", message.role, message.content.describe());
        }
    }

    Ok(())
}
