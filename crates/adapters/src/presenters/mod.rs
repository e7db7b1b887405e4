use lite_market_domain::{format_price_cents, FullScreenViewerController, Listing, ViewerEffect};

const ACTIVE_DOT: char = '●';
const INACTIVE_DOT: char = '○';

pub fn present_listing_row(listing: &Listing) -> String {
    format!(
        "{}  {}  ${} · {}",
        listing.id,
        listing.title,
        format_price_cents(listing.price_cents),
        listing.status
    )
}

pub fn present_listing_detail(listing: &Listing) -> String {
    let mut lines = vec![
        present_listing_row(listing),
        format!("seller: {}", listing.seller_id),
        format!("created: {}", listing.created_at),
    ];
    if !listing.description.is_empty() {
        lines.push(format!("description: {}", listing.description));
    }
    if let Some(cover) = listing.cover_image() {
        lines.push(format!("cover: {cover}"));
    }
    if listing.images.is_empty() {
        lines.push("images: none".to_string());
    } else {
        lines.extend(
            listing
                .images
                .iter()
                .enumerate()
                .map(|(index, image)| format!("image {}: {image}", index + 1)),
        );
    }
    lines.join("\n")
}

/// Dot row for a carousel; empty when indicators are hidden.
pub fn present_dots(indicators: &[bool]) -> String {
    if indicators.len() <= 1 {
        return String::new();
    }
    indicators
        .iter()
        .map(|active| if *active { ACTIVE_DOT } else { INACTIVE_DOT }.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn present_viewer_header(viewer: &FullScreenViewerController) -> String {
    let state = viewer.state();
    if !state.visible {
        return "viewer closed".to_string();
    }
    format!(
        "[x] {}  ({:?})",
        viewer.counter_label(),
        viewer.renderer_kind()
    )
}

pub fn present_viewer_effect(effect: &ViewerEffect) -> String {
    match effect {
        ViewerEffect::ScrollTo(command) => format!(
            "scroll to x={} (animated={})",
            command.offset, command.animated
        ),
        ViewerEffect::DelegateIndex {
            index,
            swipe_to_close,
            double_tap_zoom,
        } => format!(
            "show page {index} (swipe_to_close={swipe_to_close}, double_tap_zoom={double_tap_zoom})"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lite_market_domain::{
        GestureViewerRenderer, ListingId, ListingStatus, UserId,
    };

    fn listing() -> Listing {
        Listing {
            id: ListingId::new("item-9").expect("id"),
            title: "Desk".to_string(),
            description: String::new(),
            price_cents: 1250,
            images: vec!["https://cdn.test/a.jpg".to_string()],
            status: ListingStatus::Active,
            seller_id: UserId::new("user_1").expect("user"),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn row_shows_price_and_status() {
        assert_eq!(present_listing_row(&listing()), "item-9  Desk  $12.50 · active");
    }

    #[test]
    fn detail_lists_images_in_order() {
        let detail = present_listing_detail(&listing());
        assert!(detail.contains("\ncover: https://cdn.test/a.jpg\n"));
        assert!(detail.ends_with("image 1: https://cdn.test/a.jpg"));
        assert!(!detail.contains("description"));
    }

    #[test]
    fn detail_without_images_has_no_cover() {
        let mut bare = listing();
        bare.images.clear();
        let detail = present_listing_detail(&bare);
        assert!(!detail.contains("cover:"));
        assert!(detail.ends_with("images: none"));
    }

    #[test]
    fn dots_hidden_for_single_item() {
        assert_eq!(present_dots(&[false, true, false]), "○ ● ○");
        assert_eq!(present_dots(&[true]), "");
    }

    #[test]
    fn viewer_header_tracks_visibility() {
        let mut viewer = FullScreenViewerController::new(Box::new(GestureViewerRenderer));
        assert_eq!(present_viewer_header(&viewer), "viewer closed");

        viewer.open(vec!["a".to_string(), "b".to_string()], 1);
        assert_eq!(present_viewer_header(&viewer), "[x] 2 / 2  (GestureDelegate)");
    }
}
