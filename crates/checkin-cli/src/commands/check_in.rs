//! Check-in command implementation.

use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Args;

use checkin_core::NewCheckIn;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct CheckInArgs {
    /// Name of the business visited
    #[arg(long)]
    pub business: String,

    /// Person met at the business
    #[arg(long)]
    pub contact: String,

    #[arg(long)]
    pub contact_email: Option<String>,

    #[arg(long)]
    pub contact_phone: Option<String>,

    /// Free-text notes about the visit
    #[arg(long)]
    pub notes: Option<String>,

    /// Photo of the storefront (jpeg, png, webp, gif or heic)
    #[arg(long)]
    pub photo: Option<std::path::PathBuf>,

    /// GPS latitude
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    pub lat: Option<f64>,

    /// GPS longitude
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lng: Option<f64>,

    /// GPS accuracy in metres
    #[arg(long)]
    pub accuracy: Option<f64>,

    /// Print the created check-in as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(global: &GlobalArgs, args: CheckInArgs) -> Result<()> {
    let photo = match args.photo {
        Some(ref path) => Some(photo_data_url(path)?),
        None => None,
    };

    let api = session::connect_logged_in(global).await?;

    let checkin = NewCheckIn {
        business_name: args.business,
        contact_name: args.contact,
        contact_email: args.contact_email,
        contact_phone: args.contact_phone,
        notes: args.notes,
        photo,
        latitude: args.lat,
        longitude: args.lng,
        gps_accuracy: args.accuracy,
    };

    output::status("Submitting check-in...");
    let created = api
        .create_checkin(&checkin)
        .await
        .context("Failed to submit check-in")?;

    if args.json {
        return output::json_pretty(&created);
    }

    output::success(&format!("Checked in (ID {})", created.id));
    output::opt_field("Address", created.address_resolved.as_deref());
    output::opt_field("Maps", created.google_maps_url.as_deref());
    Ok(())
}

/// Read an image and encode it as a `data:` URL.
fn photo_data_url(path: &Path) -> Result<String> {
    let mime = image_mime(path)
        .with_context(|| format!("Unsupported photo type: {}", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read photo {}", path.display()))?;
    if bytes.is_empty() {
        bail!("Photo {} is empty", path.display());
    }
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mime_from_extension() {
        assert_eq!(image_mime(Path::new("shop.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("shop.png")), Some("image/png"));
        assert_eq!(image_mime(Path::new("shop.txt")), None);
        assert_eq!(image_mime(Path::new("shop")), None);
    }

    #[test]
    fn photo_is_base64_data_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("front.png");
        std::fs::write(&path, b"png!").unwrap();

        assert_eq!(photo_data_url(&path).unwrap(), "data:image/png;base64,cG5nIQ==");
    }

    #[test]
    fn empty_photo_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("front.jpg");
        std::fs::write(&path, b"").unwrap();
        assert!(photo_data_url(&path).is_err());
    }
}
