//! # Audio Capture Module
//!
//! Real-time audio capture using CPAL. Selects an f32 input
//! configuration close to the target sample rate, downmixes to mono
//! when the device refuses a single channel, and slices the incoming
//! stream into fixed-size analysis windows for the channel consumer.

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

/// Default samples per analysis window (~46 ms at 44.1 kHz).
pub const DEFAULT_WINDOW_SIZE: usize = 2048;

const TARGET_SAMPLE_RATE: u32 = 44100;

/// Starts audio capture from the default input device, sending one
/// `window_size` frame at a time down `sender`. Frames are dropped
/// when the consumer falls behind; the analysis loop always works on
/// fresh audio.
///
/// Returns the stream handle (capture stops when it is dropped) and
/// the negotiated sample rate.
pub fn start_capture(sender: Sender<Vec<f32>>, window_size: usize) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("no audio input device available"))?;
    log::info!("using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("no suitable f32 input format found"))?;

    let selected = supported
        .try_with_sample_rate(cpal::SampleRate(TARGET_SAMPLE_RATE))
        .unwrap_or_else(|| supported.with_max_sample_rate());
    let channels = selected.channels() as usize;
    let rate = selected.sample_rate().0;
    let config: cpal::StreamConfig = selected.into();
    log::info!("capturing at {rate} Hz, {channels} channel(s)");

    let err_fn = |err| log::error!("audio stream error: {err}");

    // Accumulates callback data until a full window is available.
    let mut window_buffer = Vec::with_capacity(window_size * 2);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            if channels == 1 {
                window_buffer.extend_from_slice(data);
            } else {
                // Downmix interleaved frames to mono.
                window_buffer.extend(
                    data.chunks_exact(channels)
                        .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                );
            }

            while window_buffer.len() >= window_size {
                let frame = window_buffer[..window_size].to_vec();
                // Ignore a full channel; the next window supersedes it.
                let _ = sender.try_send(frame);
                window_buffer.drain(..window_size);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, rate))
}

/// Picks the supported configuration closest to the target rate,
/// preferring mono f32 but accepting multichannel f32 for devices
/// that expose nothing else.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32 && c.channels() >= 1)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
            let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
            (c.channels(), min_diff.min(max_diff))
        })
}
