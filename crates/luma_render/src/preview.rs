//! Live preview streaming to the "tev" image viewer.
//!
//! Messages are length-prefixed little-endian packets over TCP to localhost.
//! A missing or dying viewer only costs a warning; rendering continues.

use crate::film::Film;
use crate::tile::{generate_tiles, Tile};
use luma_math::{Color, UVec2};
use std::io::Write;
use std::net::TcpStream;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

const TEV_ADDRESS: &str = "127.0.0.1:14158";
const CHANNELS: [&str; 3] = ["r", "g", "b"];

// tev packet types
const PACKET_CLOSE_IMAGE: u8 = 2;
const PACKET_UPDATE_CHANNEL: u8 = 3;
const PACKET_CREATE_IMAGE: u8 = 4;

/// A length-prefixed packet under construction.
struct Packet {
    buffer: Vec<u8>,
}

impl Packet {
    fn new(kind: u8) -> Self {
        let mut packet = Self {
            // the first four bytes become the total length on send
            buffer: vec![0; 4],
        };
        packet.u8(kind);
        packet
    }

    fn u8(&mut self, v: u8) -> &mut Self {
        self.buffer.push(v);
        self
    }

    fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(v as u8)
    }

    fn i32(&mut self, v: i32) -> &mut Self {
        self.buffer.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn str(&mut self, v: &str) -> &mut Self {
        self.buffer.extend_from_slice(v.as_bytes());
        self.buffer.push(0);
        self
    }

    fn f32_slice(&mut self, values: &[f32]) -> &mut Self {
        for v in values {
            self.buffer.extend_from_slice(&v.to_le_bytes());
        }
        self
    }

    fn finish(mut self) -> Vec<u8> {
        let len = self.buffer.len() as u32;
        self.buffer[0..4].copy_from_slice(&len.to_le_bytes());
        self.buffer
    }
}

/// A connection to the viewer, shared by the workers and the updater thread.
pub struct Preview {
    image_name: String,
    resolution: UVec2,
    /// Single-writer: packets must not interleave.
    stream: Mutex<Option<TcpStream>>,
}

impl Preview {
    /// Connects to the viewer and announces a fresh image.
    ///
    /// On connection failure the preview silently degrades to a no-op.
    pub fn connect(image_name: &str, resolution: UVec2) -> Self {
        let stream = match TcpStream::connect(TEV_ADDRESS) {
            Ok(stream) => Some(stream),
            Err(error) => {
                log::warn!("connection to tev failed: {error}");
                None
            }
        };

        let preview = Self {
            image_name: image_name.to_string(),
            resolution,
            stream: Mutex::new(stream),
        };

        // replace any image left over from a previous render
        let mut close = Packet::new(PACKET_CLOSE_IMAGE);
        close.str(image_name);
        preview.send(close);

        let mut create = Packet::new(PACKET_CREATE_IMAGE);
        create
            .bool(true) // grab focus
            .str(image_name)
            .i32(resolution.x as i32)
            .i32(resolution.y as i32)
            .i32(CHANNELS.len() as i32);
        for channel in CHANNELS {
            create.str(channel);
        }
        preview.send(create);

        preview
    }

    pub fn is_connected(&self) -> bool {
        self.stream.lock().unwrap().is_some()
    }

    /// Sends the pixels of one finished tile.
    pub fn update_block(&self, tile: &Tile, pixels: &[Color]) {
        if !self.is_connected() {
            return;
        }
        let mut channel_data = Vec::with_capacity(pixels.len());
        for (index, channel) in CHANNELS.iter().enumerate() {
            channel_data.clear();
            channel_data.extend(pixels.iter().map(|c| c[index]));

            let mut update = Packet::new(PACKET_UPDATE_CHANNEL);
            update
                .bool(false)
                .str(&self.image_name)
                .str(channel)
                .i32(tile.x as i32)
                .i32(tile.y as i32)
                .i32(tile.width as i32)
                .i32(tile.height as i32)
                .f32_slice(&channel_data);
            self.send(update);
        }
    }

    /// Sends the whole film, split into viewer-friendly blocks.
    pub fn update_all(&self, film: &Film) {
        for tile in generate_tiles(self.resolution, 128) {
            let pixels: Vec<Color> = tile.pixels().map(|p| film.get(p)).collect();
            self.update_block(&tile, &pixels);
        }
    }

    fn send(&self, packet: Packet) {
        let mut guard = self.stream.lock().unwrap();
        let Some(stream) = guard.as_mut() else {
            return;
        };
        if let Err(error) = stream.write_all(&packet.finish()) {
            log::warn!("connection to tev lost: {error}");
            *guard = None;
        }
    }

    /// Starts a thread that re-sends the film at a fixed interval, for
    /// algorithms that refine pixels progressively.
    ///
    /// The thread reads the film under its mutex; a worker may publish a tile
    /// between two channel packets, which is fine for an approximate preview.
    pub fn start_regular_updates(
        self: &Arc<Self>,
        film: Arc<Mutex<Film>>,
        interval: Duration,
    ) -> RegularUpdates {
        let preview = self.clone();
        let shutdown = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_shutdown = shutdown.clone();

        let handle = std::thread::spawn(move || {
            let (stop, signal) = &*thread_shutdown;
            loop {
                // wait under the lock, stream outside of it
                {
                    let guard = stop.lock().unwrap();
                    let (guard, _timeout) = signal.wait_timeout(guard, interval).unwrap();
                    if *guard {
                        return;
                    }
                }
                preview.update_all(&film.lock().unwrap());
            }
        });

        RegularUpdates {
            shutdown,
            handle: Some(handle),
        }
    }
}

/// Guard for the regular-update thread; joins it cleanly on drop.
pub struct RegularUpdates {
    shutdown: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for RegularUpdates {
    fn drop(&mut self) {
        let (stop, signal) = &*self.shutdown;
        *stop.lock().unwrap() = true;
        signal.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
