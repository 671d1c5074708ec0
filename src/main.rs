fn main() -> anyhow::Result<()> {
    vcfconv::cli::run()
}
