//! Presentation server: one static page on `GET /`, nothing else.

use axum::{extract::State, response::Html, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn router(page: String) -> Router {
    Router::new()
        .route("/", get(index))
        .with_state(Arc::<str>::from(page))
}

async fn index(State(page): State<Arc<str>>) -> Html<String> {
    Html(page.to_string())
}

/// Bind `addr` and serve the page until the process is stopped.
pub async fn serve(page: String, addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot bind {addr}: {e}"))?;
    serve_on(listener, page).await
}

pub async fn serve_on(listener: TcpListener, page: String) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    log::info!("dashboard listening on {local}");
    println!("Dashboard running at http://{local}/");
    axum::serve(listener, router(page)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn get(addr: std::net::SocketAddr, path: &str) -> String {
        let mut stream = std::net::TcpStream::connect(addr).unwrap();
        write!(
            stream,
            "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn serves_the_page_on_root_only() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(serve_on(listener, "<h1>dashboard</h1>".to_string()));

            let root = tokio::task::spawn_blocking(move || get(addr, "/")).await.unwrap();
            assert!(root.starts_with("HTTP/1.1 200"), "unexpected response: {root}");
            assert!(root.contains("text/html"));
            assert!(root.ends_with("<h1>dashboard</h1>"));

            let other = tokio::task::spawn_blocking(move || get(addr, "/api/state"))
                .await
                .unwrap();
            assert!(other.starts_with("HTTP/1.1 404"), "unexpected response: {other}");
        });
    }
}
