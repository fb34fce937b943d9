use std::process;

fn main() {
    env_logger::init();
    // compare the two fixed logs
    if let Err(err) = jldiff::run(jldiff::Config::default()) {
        eprintln!("Application error: {}.", err);
        process::exit(1);
    };
}
