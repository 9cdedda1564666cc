#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    ngo_docs_server::run().await
}
