// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod server;
mod template;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use assetgate_core::TrackerState;
    use portpicker::pick_unused_port;
    use reqwest::StatusCode;
    use tokio::spawn;
    use tokio::time::sleep;
    use tokio::time::timeout;

    use crate::cmd::serve::server::ServerConfig;
    use crate::cmd::serve::server::start_server;
    use crate::error::Fallible;
    use crate::helper::PNG_BYTES;
    use crate::helper::create_tmp_directory;
    use crate::utils::wait_for_server;

    const TEST_HOST: &str = "127.0.0.1";

    fn create_tmp_gate() -> Fallible<PathBuf> {
        let root = create_tmp_directory()?;
        std::fs::write(
            root.join("assetgate.toml"),
            r#"
title = "Onboarding"
content = "welcome.md"
show_progress = true
images = ["goal.png", "broken.png", "goal.png"]

[fallback]
heading = "Loading Digestibly..."
"#,
        )?;
        std::fs::write(root.join("welcome.md"), "# Welcome\n\n![goal](goal.png)\n")?;
        std::fs::write(root.join("goal.png"), PNG_BYTES)?;
        std::fs::write(root.join("broken.png"), "not an image")?;
        Ok(root.join("assetgate.toml"))
    }

    async fn fetch_state(host: &str, port: u16) -> Fallible<TrackerState> {
        let response = reqwest::get(format!("http://{host}:{port}/state")).await?;
        let state: TrackerState = serde_json::from_str(&response.text().await?)?;
        Ok(state)
    }

    async fn wait_until_ready(host: &str, port: u16) -> Fallible<TrackerState> {
        timeout(Duration::from_secs(5), async {
            loop {
                match fetch_state(host, port).await {
                    Ok(state) if state.ready => return Ok(state),
                    Ok(_) => {}
                    Err(e) => return Err(e),
                }
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("gate never opened")
    }

    #[tokio::test]
    async fn test_start_server_with_missing_manifest() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let config = ServerConfig {
            manifest: Some("./derpherp.toml".to_string()),
            host: TEST_HOST.to_string(),
            port,
        };
        let result = start_server(config).await;
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: manifest does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let manifest = create_tmp_gate()?;
        let config = ServerConfig {
            manifest: Some(manifest.display().to_string()),
            host: TEST_HOST.to_string(),
            port,
        };
        spawn(async move { start_server(config).await });
        wait_for_server(TEST_HOST, port).await?;

        // The gate opens once every image is resolved, failures included.
        let state = wait_until_ready(TEST_HOST, port).await?;
        assert_eq!(state.progress_percent, 100.0);
        assert_eq!(state.resolved, 3);
        assert_eq!(state.total, 3);
        assert!(state.loaded.contains("goal.png"));
        assert!(state.failed.contains("broken.png"));

        // Hit the root endpoint.
        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/")).await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        let html = response.text().await?;
        assert!(html.contains("<h1>Welcome</h1>"));
        assert!(html.contains("src=\"/file/goal.png\""));
        assert!(!html.contains("Loading Digestibly..."));

        // Hit the `style.css` endpoint.
        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/style.css")).await?;
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");

        // Hit the file endpoint.
        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/file/goal.png")).await?;
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
        assert_eq!(response.bytes().await?.to_vec(), PNG_BYTES.to_vec());

        // Hit the file endpoint with a non-existent file.
        let response =
            reqwest::get(format!("http://{TEST_HOST}:{port}/file/missing.png")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Hit the not found endpoint.
        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/herp-derp")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_gate_opens_immediately() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let root = create_tmp_directory()?;
        std::fs::write(root.join("assetgate.toml"), "title = \"Nothing\"\n")?;
        let config = ServerConfig {
            manifest: Some(root.join("assetgate.toml").display().to_string()),
            host: TEST_HOST.to_string(),
            port,
        };
        spawn(async move { start_server(config).await });
        wait_for_server(TEST_HOST, port).await?;

        let state = fetch_state(TEST_HOST, port).await?;
        assert!(state.ready);
        assert_eq!(state.progress_percent, 100.0);

        let html = reqwest::get(format!("http://{TEST_HOST}:{port}/"))
            .await?
            .text()
            .await?;
        assert!(html.contains("<h1>Nothing</h1>"));
        Ok(())
    }
}
