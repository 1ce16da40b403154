#[tokio::main]
async fn main() {
    if let Err(e) = clinirec_lib::run().await {
        eprintln!("clinirec: {e}");
        std::process::exit(1);
    }
}
