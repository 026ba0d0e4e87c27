use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tilegen::preview::save_preview;
use tilegen::{GenerationConfig, HandleAllocator, generate_world};
use tracing_subscriber::EnvFilter;

/// Генератор тайлового мира
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (без него берутся значения по умолчанию)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Каталог для world.json и preview.png
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Переопределяет сид из конфигурации
    #[arg(short, long)]
    seed: Option<u64>,

    /// Сохранить PNG-превью
    #[arg(short, long)]
    preview: bool,

    /// Размер клетки в пикселях на превью
    #[arg(long, default_value_t = 4)]
    scale: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let mut config = match &cli.config {
        Some(path) => GenerationConfig::from_toml_file(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    println!(
        "Генерация мира (размер: {}×{}, сид: {})...",
        config.width, config.length, config.seed
    );
    let mut renderer = HandleAllocator::new();
    let world = generate_world(&config, &mut renderer)?;

    fs::create_dir_all(&cli.output)?;
    let json_path = cli.output.join("world.json");
    println!("Сохранение в {:?}", json_path);
    world.save_json(&json_path)?;

    if cli.preview {
        let png_path = cli.output.join("preview.png");
        println!("Сохранение превью в {:?}", png_path);
        save_preview(&world, &png_path, cli.scale)?;
    }

    for warning in &world.diagnostics {
        println!("⚠ {warning}");
    }

    println!(
        "\nГотово! Поселений: {}, дорог: {}, элементов на сцене: {}.",
        world.settlements.len(),
        world.paths.len(),
        renderer.live_count()
    );
    Ok(())
}
