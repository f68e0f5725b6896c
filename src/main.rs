//! # Vitrine CLI
//!
//! Usage:
//!   vitrine data.json -o catalogo-produtos.pdf
//!   cat data.json | vitrine -o catalog.pdf
//!   vitrine data.json --measured --category-per-page
//!   vitrine data.json --layout-json > layout.json
//!   vitrine --example > data.json
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` to see every
//! page decision.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use vitrine::layout::LayoutMode;
use vitrine::loader::{parse_products, JsonFileSource};
use vitrine::model::CoverPage;
use vitrine::{export, CancelToken, CatalogError, ExportOptions, Product, CATALOG_FILENAME};

const USAGE: &str = "\
Usage: vitrine [data.json] [options]

Options:
  -o <file>              Output path (default: catalogo-produtos.pdf)
  --config <file>        Export options as JSON
  --measured             Size entries from their descriptions
  --category-per-page    Start every category on a new page
  --title <text>         Cover page title
  --subtitle <text>      Cover page subtitle
  --no-cover             Leave out the cover page
  --layout-json          Print the page layout as JSON instead of a PDF
  --example              Print sample product data
  -h, --help             Show this help";

#[derive(Debug, Default)]
struct CliArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    measured: bool,
    category_per_page: bool,
    title: Option<String>,
    subtitle: Option<String>,
    no_cover: bool,
    layout_json: bool,
    example: bool,
    help: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("✗ {}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    if args.help {
        println!("{}", USAGE);
        return;
    }
    if args.example {
        print!("{}", example_products_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("  hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match arg.as_str() {
            "-o" | "--output" => cli.output = Some(PathBuf::from(value(&arg)?)),
            "--config" => cli.config = Some(PathBuf::from(value(&arg)?)),
            "--title" => cli.title = Some(value(&arg)?),
            "--subtitle" => cli.subtitle = Some(value(&arg)?),
            "--measured" => cli.measured = true,
            "--category-per-page" => cli.category_per_page = true,
            "--no-cover" => cli.no_cover = true,
            "--layout-json" => cli.layout_json = true,
            "--example" => cli.example = true,
            "-h" | "--help" => cli.help = true,
            flag if flag.starts_with('-') => return Err(format!("Unknown option '{}'", flag)),
            path => {
                if cli.input.is_some() {
                    return Err(format!("Unexpected argument '{}'", path));
                }
                cli.input = Some(PathBuf::from(path));
            }
        }
    }
    Ok(cli)
}

fn run(args: &CliArgs) -> Result<(), CatalogError> {
    let (products, base_dir) = read_products(args)?;
    let options = build_options(args, base_dir)?;

    if args.layout_json {
        let layout = export::layout_catalog(&products, &options);
        let json = serde_json::to_string_pretty(&layout)?;
        println!("{}", json);
        return Ok(());
    }

    let pdf = export::export_catalog(&products, &options, &CancelToken::new())?;
    for warning in &pdf.warnings {
        eprintln!("! {}", warning);
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(CATALOG_FILENAME));
    fs::write(&output_path, &pdf.bytes).map_err(|source| CatalogError::Io {
        path: output_path.clone(),
        source,
    })?;
    eprintln!(
        "✓ Written {} pages ({} bytes) to {}",
        pdf.page_count,
        pdf.bytes.len(),
        output_path.display()
    );
    Ok(())
}

/// Products from the input file, or stdin when no file is given, plus
/// the directory relative image paths resolve against.
fn read_products(args: &CliArgs) -> Result<(Vec<Product>, Option<PathBuf>), CatalogError> {
    match &args.input {
        Some(path) => {
            let source = JsonFileSource::new(path);
            Ok((source.try_fetch()?, source.base_dir()))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CatalogError::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok((parse_products(&buf)?, None))
        }
    }
}

fn build_options(args: &CliArgs, base_dir: Option<PathBuf>) -> Result<ExportOptions, CatalogError> {
    let mut options = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            ExportOptions::from_json(&json)?
        }
        None => ExportOptions::default(),
    };

    if args.measured {
        options.layout.mode = LayoutMode::MeasuredHeight;
    }
    if args.category_per_page {
        options.layout.category_per_page = true;
    }
    if options.image_base_dir.is_none() {
        options.image_base_dir = base_dir;
    }

    options.cover = if args.no_cover {
        None
    } else {
        let mut cover = options.cover.take().unwrap_or_else(default_cover);
        if let Some(title) = &args.title {
            cover.title = title.clone();
        }
        if let Some(subtitle) = &args.subtitle {
            cover.subtitle = Some(subtitle.clone());
        }
        if cover.date.is_none() {
            cover.date = Some(chrono::Local::now().format("Data: %d/%m/%Y").to_string());
        }
        Some(cover)
    };

    Ok(options)
}

fn default_cover() -> CoverPage {
    CoverPage {
        title: "Catálogo de Produtos".to_string(),
        subtitle: Some("Autotech Distribuidora".to_string()),
        date: None,
    }
}

fn example_products_json() -> &'static str {
    r##"{
  "produtos": [
    {
      "nome": "Pastilha de freio dianteira",
      "imagem": "img/pastilha-dianteira.jpg",
      "tipo": "freios",
      "descricao": "Pastilha cerâmica para eixo dianteiro, baixo nível de ruído e poeira.",
      "codigo": ["PF-1020", "PF-1021"]
    },
    {
      "nome": "Disco de freio ventilado",
      "imagem": "img/disco-ventilado.jpg",
      "tipo": "freios",
      "descricao": "Disco ventilado de 280 mm com tratamento anticorrosivo.",
      "codigo": "DF-2800"
    },
    {
      "nome": "Filtro de óleo",
      "imagem": "img/filtro-oleo.png",
      "tipo": "filtros",
      "descricao": "Filtro de óleo com válvula antirretorno para motores 1.0 a 2.0.",
      "codigo": "FO-110"
    },
    {
      "nome": "Filtro de ar do motor",
      "imagem": "img/filtro-ar.png",
      "tipo": "filtros",
      "descricao": "Elemento filtrante em papel plissado de alta retenção.",
      "codigo": ["FA-330"]
    },
    {
      "nome": "Óleo sintético 5W30",
      "imagem": "img/oleo-5w30.jpg",
      "tipo": "óleos",
      "descricao": "Óleo 100% sintético, API SP, embalagem de 1 litro.",
      "codigo": "OS-5W30-1L"
    },
    {
      "nome": "Chaveiro promocional",
      "imagem": "",
      "descricao": "Brinde sem categoria: aparece na vitrine, mas não no PDF.",
      "codigo": "BR-001"
    }
  ]
}
"##
}
