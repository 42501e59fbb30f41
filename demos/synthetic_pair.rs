use image::{Rgb, RgbImage};

/// Writes a synthetic before/after pair: a forest with a river and a road,
/// and the same scene after a storm cleared a diagonal swath of canopy.
fn main() -> anyhow::Result<()> {
    let (width, height) = (800u32, 600u32);

    let scene = |x: u32, y: u32, storm: bool| -> Rgb<u8> {
        let jitter = ((x * 7 + y * 13) % 24) as u8;
        if (y as i32 - 300).abs() < 20 {
            return Rgb([30, 70, 150 + jitter]);
        }
        if (x as i32 - 500).abs() < 8 {
            return Rgb([160 + jitter / 2, 160 + jitter / 2, 155 + jitter / 2]);
        }
        let in_swath = storm && (x as i32 - y as i32).abs() < 90;
        if in_swath {
            Rgb([140 + jitter, 95, 50])
        } else {
            Rgb([25 + jitter, 130 + jitter * 2, 30])
        }
    };

    let pre = RgbImage::from_fn(width, height, |x, y| scene(x, y, false));
    let post = RgbImage::from_fn(width, height, |x, y| scene(x, y, true));

    pre.save("pre_event.png")?;
    post.save("post_event.png")?;
    println!("Created pre_event.png and post_event.png ({}x{})", width, height);
    println!("Run: canopyscan pre_event.png post_event.png --verbose");
    Ok(())
}
