use anyhow::Result;

fn main() -> Result<()> {
    chat_ffs::cli::run()
}
