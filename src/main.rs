use junoc::projects::cli;

fn main() {
    std::process::exit(cli::start_cli());
}
