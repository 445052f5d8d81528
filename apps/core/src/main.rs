fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match newtab_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[newtab-core] {error}");
            eprintln!("{}", newtab_core::runtime::USAGE);
            std::process::exit(2);
        }
    };

    if let Err(error) = newtab_core::runtime::run_with_options(options) {
        log::error!("runtime failed: {error}");
        eprintln!("[newtab-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
