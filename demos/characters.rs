use marvel_http::{ExecutorConfig, MarvelClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let name = std::env::args().nth(1).unwrap_or_else(|| "Spider-Man".to_owned());

    let client = MarvelClient::from_env()
        .map_err(anyhow::Error::msg)?
        .with_config(ExecutorConfig {
            timeout_ms: 5_000,
            retry_delay_ms: 1_000,
            max_retries: 2,
        });

    let page = client.characters(&name).await?;
    for character in &page.results {
        println!(
            "{} {}",
            character.id,
            character.name.as_deref().unwrap_or("<unnamed>")
        );

        let comics = client.comics(character.id).await?;
        for comic in comics.results {
            println!("  {}", comic.title.as_deref().unwrap_or("<untitled>"));
        }
    }

    Ok(())
}
