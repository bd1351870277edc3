use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("folio")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert article pages into DOCX documents")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: <title>.docx for DOCX, stdout otherwise)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (docx, json, markdown)")
                .value_name("FORMAT")
                .default_value("docx")
                .value_parser(["docx", "json", "markdown"]),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(--referer <URL> "Referer sent with page and image requests").value_name("URL"))
        .arg(clap::arg!(--no_render "Never fall back to the headless browser"))
        .arg(clap::arg!(--no_images "Skip image download and embedding"))
        .arg(
            clap::arg!(--save_html <FILE> "Save the fetched markup to a file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--max_depth <NUM> "Maximum element depth below the content root").default_value("20"))
        .arg(
            clap::arg!(--min_root_chars <NUM> "Minimum text length for the largest-container fallback root")
                .default_value("500"),
        )
        .arg(clap::arg!(--no_dedupe "Keep fallback blocks that duplicate extracted ones"))
        .arg(clap::arg!(--metadata_only "Print title, author and date as JSON without extracting content"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "folio", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "folio", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "folio", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "folio", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
