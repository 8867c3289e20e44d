#[tokio::main]
async fn main() {
    bloodlink_server::start_server().await;
}
