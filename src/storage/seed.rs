use super::models::Clip;

const SEED_CLIPS: [(&str, &str, [&str; 2]); 10] = [
    (
        "https://samplelib.com/lib/preview/mp4/sample-5s.mp4",
        "City Timelapse",
        ["timelapse", "city"],
    ),
    (
        "https://samplelib.com/lib/preview/mp4/sample-10s.mp4",
        "Close-up Nature",
        ["nature", "macro"],
    ),
    (
        "https://samplelib.com/lib/preview/mp4/sample-15s.mp4",
        "W3Schools Sample",
        ["sample", "demo"],
    ),
    (
        "https://www.w3schools.com/html/mov_bbb.mp4",
        "Big Buck Bunny (trim)",
        ["animation", "demo"],
    ),
    (
        "https://samplelib.com/lib/preview/mp4/sample-5s.mp4",
        "Ocean Waves",
        ["ocean", "nature"],
    ),
    (
        "https://samplelib.com/lib/preview/mp4/sample-10s.mp4",
        "Night Drive",
        ["car", "city"],
    ),
    (
        "https://samplelib.com/lib/preview/mp4/sample-15s.mp4",
        "Minimalist Shapes",
        ["design", "abstract"],
    ),
    (
        "https://samplelib.com/lib/preview/mp4/sample-5s.mp4",
        "Street Performer",
        ["music", "street"],
    ),
    (
        "https://samplelib.com/lib/preview/mp4/sample-10s.mp4",
        "Coffee Pour",
        ["food", "coffee"],
    ),
    (
        "https://samplelib.com/lib/preview/mp4/sample-15s.mp4",
        "Clouds Timelapse",
        ["timelapse", "clouds"],
    ),
];

/// The ten clips a fresh or reset catalog starts with, ids 1 through 10.
pub fn default_clips() -> Vec<Clip> {
    SEED_CLIPS
        .iter()
        .zip(1u64..)
        .map(|((url, title, tags), id)| Clip {
            id,
            video_url: url.to_string(),
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}
