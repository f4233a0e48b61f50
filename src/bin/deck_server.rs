//! Deck server: runs the camera -> pose -> slide-command pipeline and serves
//! the annotated frames as an MJPEG stream over HTTP.
//!
//! Routes: `/` (viewer page) and `/video_feed` (multipart stream). The
//! pipeline owns the camera on one dedicated thread; HTTP clients fan out
//! from a broadcast channel. While no client is subscribed the pipeline
//! idles, so a stray pose cannot flip slides with nobody watching.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use surya_deck::camera::OpenCvCamera;
use surya_deck::config::Config;
use surya_deck::control::XdotoolKeys;
use surya_deck::pipeline::FramePipeline;
use surya_deck::pose::BlazeDetector;
use surya_deck::stream::STREAM_CONTENT_TYPE;

const CONFIG_PATH: &str = "deck_server.toml";

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

type LogFile = Arc<Mutex<std::io::BufWriter<std::fs::File>>>;

fn open_log_file() -> Result<LogFile> {
    std::fs::create_dir_all("logs")?;
    let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = format!("logs/deck_{}.log", ts);
    let file = std::fs::File::create(&path)?;
    eprintln!("Log: {}", path);
    Ok(Arc::new(Mutex::new(std::io::BufWriter::new(file))))
}

macro_rules! log {
    ($logfile:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        eprintln!("{}", msg);
        if let Ok(mut f) = $logfile.lock() {
            let _ = writeln!(f, "{}", msg);
            let _ = f.flush();
        }
    }};
}

// ---------------------------------------------------------------------------
// Pipeline thread
// ---------------------------------------------------------------------------

fn spawn_pipeline_thread(
    config: &Config,
    tx: broadcast::Sender<Bytes>,
    logfile: LogFile,
) -> Result<()> {
    // Open camera and model on the current thread to report errors immediately
    let camera = OpenCvCamera::open_with_config(
        config.camera.index,
        Some(config.camera.width),
        Some(config.camera.height),
        None,
    )?;
    let (width, height) = camera.resolution();
    log!(
        logfile,
        "[camera] opened index {} at {}x{}",
        config.camera.index,
        width,
        height
    );

    let detector = BlazeDetector::new(
        &config.detector.model_path,
        config.detector.min_detection_confidence,
        config.detector.min_landmark_visibility,
    )
    .with_context(|| format!("failed to load {}", config.detector.model_path))?;
    log!(logfile, "[detector] loaded {}", config.detector.model_path);

    let mut pipeline =
        FramePipeline::new(camera, detector, XdotoolKeys, &config.stream, &config.control);
    let verbose = config.verbose;

    std::thread::spawn(move || {
        let mut fps_counter: u32 = 0;
        let mut dispatch_counter: u32 = 0;
        let mut fps_timer = Instant::now();

        loop {
            if tx.receiver_count() == 0 {
                std::thread::sleep(Duration::from_millis(100));
                fps_timer = Instant::now();
                fps_counter = 0;
                continue;
            }

            let outcome = match pipeline.next_outcome() {
                Ok(Some(outcome)) => outcome,
                Ok(None) => {
                    log!(logfile, "[pipeline] source exhausted, stopping");
                    break;
                }
                Err(e) => {
                    log!(logfile, "[pipeline] frame error: {e:#}");
                    std::thread::sleep(Duration::from_millis(5));
                    continue;
                }
            };

            if verbose {
                if let Some(verdict) = &outcome.verdict {
                    log!(
                        logfile,
                        "[verbose] label={:?} matched={} command={:?} dispatched={}",
                        verdict.label,
                        verdict.matched,
                        outcome.command,
                        outcome.dispatched
                    );
                }
                if let Some(missing) = outcome.incomplete {
                    log!(logfile, "[verbose] incomplete skeleton: missing {:?}", missing);
                }
            }

            if outcome.dispatched {
                dispatch_counter += 1;
            }

            // send only fails when every receiver vanished mid-frame
            let _ = tx.send(outcome.part);

            fps_counter += 1;
            if fps_timer.elapsed() >= Duration::from_secs(1) {
                log!(
                    logfile,
                    "[fps] {} ({} clients, {} keys)",
                    fps_counter,
                    tx.receiver_count(),
                    dispatch_counter
                );
                fps_counter = 0;
                dispatch_counter = 0;
                fps_timer = Instant::now();
            }
        }
    });

    Ok(())
}

// ---------------------------------------------------------------------------
// HTTP handling
// ---------------------------------------------------------------------------

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Surya Namaskar Deck</title>
<style>
body { background: #111; color: #eee; font-family: sans-serif; text-align: center; }
img { margin-top: 1em; max-width: 95vw; }
</style>
</head>
<body>
<h1>Surya Namaskar Deck</h1>
<p>Raise a wrist into a top corner to change slides: left = previous, right = next.</p>
<img src="/video_feed" alt="pose stream">
</body>
</html>
"#;

/// Extract method and path from an HTTP request head.
fn parse_request_line(head: &str) -> Option<(&str, &str)> {
    let line = head.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let path = parts.next()?;
    parts.next()?; // HTTP version must be present
    Some((method, path))
}

async fn respond(
    stream: &mut TcpStream,
    status: &str,
    content_type: &str,
    body: &[u8],
) -> Result<()> {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body).await?;
    Ok(())
}

/// Forward broadcast parts to one client until it disconnects.
async fn stream_video(mut stream: TcpStream, mut rx: broadcast::Receiver<Bytes>) -> Result<()> {
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n",
        STREAM_CONTENT_TYPE
    );
    stream.write_all(head.as_bytes()).await?;

    loop {
        match rx.recv().await {
            Ok(part) => stream.write_all(&part).await?,
            // slow client: skip the missed frames and resume at the live edge
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    Ok(())
}

async fn handle_client(
    mut stream: TcpStream,
    addr: SocketAddr,
    tx: broadcast::Sender<Bytes>,
    logfile: LogFile,
) -> Result<()> {
    // Read the request head; routing only needs the request line
    let mut buf = vec![0u8; 4096];
    let mut filled = 0;
    loop {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Ok(());
        }
        filled += n;
        if buf[..filled].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if filled == buf.len() {
            anyhow::bail!("request head too large");
        }
    }

    let head = String::from_utf8_lossy(&buf[..filled]);
    let (method, path) = match parse_request_line(&head) {
        Some(parsed) => parsed,
        None => {
            respond(&mut stream, "400 Bad Request", "text/plain", b"bad request").await?;
            return Ok(());
        }
    };

    if method != "GET" {
        respond(
            &mut stream,
            "405 Method Not Allowed",
            "text/plain",
            b"method not allowed",
        )
        .await?;
        return Ok(());
    }

    match path {
        "/" => {
            respond(
                &mut stream,
                "200 OK",
                "text/html; charset=utf-8",
                INDEX_HTML.as_bytes(),
            )
            .await
        }
        "/video_feed" => {
            // subscribe here, not at accept, so page loads alone do not
            // wake the pipeline
            log!(logfile, "[http] {} started streaming", addr);
            let result = stream_video(stream, tx.subscribe()).await;
            log!(logfile, "[http] {} stopped streaming", addr);
            result
        }
        _ => respond(&mut stream, "404 Not Found", "text/plain", b"not found").await,
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);
    let logfile = open_log_file()?;
    log!(logfile, "Deck Server ({})", env!("GIT_VERSION"));
    log!(
        logfile,
        "[config] listen_addr={} camera={} ({}x{}) model={} control={} cooldown={}ms",
        config.listen_addr,
        config.camera.index,
        config.camera.width,
        config.camera.height,
        config.detector.model_path,
        config.control.enabled,
        config.control.cooldown_ms
    );

    // Receiver dropped at once: the count stays 0 until a client subscribes
    let (tx, _) = broadcast::channel::<Bytes>(8);
    spawn_pipeline_thread(&config, tx.clone(), logfile.clone())?;

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    log!(logfile, "Listening on http://{}", config.listen_addr);

    loop {
        let (stream, addr) = listener.accept().await?;
        stream.set_nodelay(true)?;
        let tx = tx.clone();
        let logfile = logfile.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, addr, tx, logfile.clone()).await {
                log!(logfile, "[http] {} error: {e:#}", addr);
            }
        });
    }
}
