use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = pheno_offset::cli::parse();
    app::run(args)
}
