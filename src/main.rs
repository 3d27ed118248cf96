#[actix_web::main]
async fn main() -> std::io::Result<()> {
    devis_server::run().await
}
