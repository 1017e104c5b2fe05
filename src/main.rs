fn main() -> anyhow::Result<()> {
    logbook::cli::run()
}
