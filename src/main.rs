fn main() {
    if let Err(err) = flow_layout::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
