use crate::error::ParseError;
use crate::models::Listing;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Mis-decoded superscript two that the site puts after the area.
const BROKEN_SUPERSCRIPT_TWO: &str = "Â²";

const LISTING: &str = ".Box.ObjektListItem";
const TITLE: &str = ".ObjektTyp";
const LINK: &str = "a[href]";
const ADDRESS: &str = ".ObjektAdress";
const REGION: &str = "dd.ObjektOmrade";
const FLOOR: &str = "dd.ObjektVaning.hidden-phone";
const AREA: &str = "dd.ObjektYta";
const RENT: &str = "dd.ObjektHyra";
const MOVE_IN: &str = "dd.ObjektInflytt.hidden-phone";

struct Selectors {
    listing: Selector,
    title: Selector,
    link: Selector,
    address: Selector,
    region: Selector,
    floor: Selector,
    area: Selector,
    rent: Selector,
    move_in: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        // The selector strings are constants; a failure here is a typo.
        let parse = |css: &str| Selector::parse(css).expect("invalid built-in selector");
        Selectors {
            listing: parse(LISTING),
            title: parse(TITLE),
            link: parse(LINK),
            address: parse(ADDRESS),
            region: parse(REGION),
            floor: parse(FLOOR),
            area: parse(AREA),
            rent: parse(RENT),
            move_in: parse(MOVE_IN),
        }
    })
}

/// Concatenates every ASCII digit in `text` into one number.
///
/// All other characters are ignored, so `"12 500 kr"` is 12500 and
/// `"25.5"` is 255. Text without digits yields 0. Saturates at `u64::MAX`.
pub fn extract_int(text: &str) -> u64 {
    text.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d)))
}

/// Splits `"Storgatan 1 / 1201"` into `("Storgatan 1", "1201")`.
///
/// Exactly one `/` is accepted.
pub fn split_address(text: &str) -> Option<(String, String)> {
    let (street, unit) = text.split_once('/')?;
    if unit.contains('/') {
        return None;
    }
    Some((street.trim().to_string(), unit.trim().to_string()))
}

/// Parses every listing block in the page, in document order.
///
/// A block missing any expected field fails the whole page.
pub fn parse_listings(html: &str) -> Result<Vec<Listing>, ParseError> {
    let document = Html::parse_document(html);
    let blocks: Vec<_> = document.select(&selectors().listing).collect();
    info!("Found {} listing blocks in HTML", blocks.len());

    blocks
        .into_iter()
        .enumerate()
        .map(|(index, block)| parse_listing(index, block))
        .collect()
}

fn parse_listing(index: usize, block: ElementRef<'_>) -> Result<Listing, ParseError> {
    let sel = selectors();
    let find = |selector: &Selector, css: &'static str| {
        block
            .select(selector)
            .next()
            .ok_or(ParseError::MissingElement { index, selector: css })
    };

    let title = find(&sel.title, TITLE)?;
    let url = title
        .select(&sel.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or(ParseError::MissingLink { index })?
        .to_string();
    let apartment_type = text_of(title);

    let address_text = text_of(find(&sel.address, ADDRESS)?);
    let (adress, apartment_number) =
        split_address(&address_text).ok_or_else(|| ParseError::MalformedAddress {
            index,
            text: address_text.clone(),
        })?;

    let region = text_of(find(&sel.region, REGION)?);
    let floor = extract_int(&text_of(find(&sel.floor, FLOOR)?));
    let square_meters = extract_int(&text_of(find(&sel.area, AREA)?).replace(BROKEN_SUPERSCRIPT_TWO, ""));
    let rent = extract_int(&text_of(find(&sel.rent, RENT)?).replace('\u{a0}', " "));
    let move_in_date = text_of(find(&sel.move_in, MOVE_IN)?);

    debug!("Parsed listing #{}: {} @ {}", index, apartment_type, adress);

    Ok(Listing {
        url,
        apartment_type,
        adress,
        apartment_number,
        region,
        floor,
        square_meters,
        rent,
        move_in_date,
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<div class="ObjektLista">
  <div class="Box ObjektListItem">
    <h3 class="ObjektTyp"><a href="https://sssb.se/objekt/1201">1 rum och kök</a></h3>
    <h4 class="ObjektAdress">Storgatan 1 / 1201</h4>
    <dl>
      <dd class="ObjektOmrade">Lappkärrsberget</dd>
      <dd class="ObjektVaning hidden-phone">3</dd>
      <dd class="ObjektYta">32 mÂ²</dd>
      <dd class="ObjektHyra">5&nbsp;450 kr</dd>
      <dd class="ObjektInflytt hidden-phone">2026-12-01</dd>
    </dl>
  </div>
  <div class="Box ObjektListItem">
    <h3 class="ObjektTyp"><a href="https://sssb.se/objekt/0412">Korridorrum</a></h3>
    <h4 class="ObjektAdress">  Körsbärsvägen 4 /0412 </h4>
    <dl>
      <dd class="ObjektOmrade">Forum</dd>
      <dd class="ObjektVaning hidden-phone">Bottenvåning</dd>
      <dd class="ObjektYta">18 m²</dd>
      <dd class="ObjektHyra">3 910 kr</dd>
      <dd class="ObjektInflytt hidden-phone">Omgående</dd>
    </dl>
  </div>
</div>
</body></html>
"#;

    #[test]
    fn extract_int_concatenates_digits() {
        assert_eq!(extract_int("25 m²"), 25);
        assert_eq!(extract_int("12 500 kr"), 12_500);
        assert_eq!(extract_int("25.5"), 255);
        assert_eq!(extract_int("-3"), 3);
        assert_eq!(extract_int("no digits"), 0);
        assert_eq!(extract_int("²"), 0);
        assert_eq!(extract_int(""), 0);
    }

    #[test]
    fn split_address_trims_both_sides() {
        assert_eq!(
            split_address("Storgatan 1 / 1201"),
            Some(("Storgatan 1".to_string(), "1201".to_string()))
        );
        assert_eq!(split_address("Storgatan 1"), None);
        assert_eq!(split_address("a / b / c"), None);
    }

    #[test]
    fn parses_listings_in_document_order() {
        let listings = parse_listings(PAGE).unwrap();
        assert_eq!(listings.len(), 2);

        let first = &listings[0];
        assert_eq!(first.url, "https://sssb.se/objekt/1201");
        assert_eq!(first.apartment_type, "1 rum och kök");
        assert_eq!(first.adress, "Storgatan 1");
        assert_eq!(first.apartment_number, "1201");
        assert_eq!(first.region, "Lappkärrsberget");
        assert_eq!(first.floor, 3);
        assert_eq!(first.square_meters, 32);
        assert_eq!(first.rent, 5_450);
        assert_eq!(first.move_in_date, "2026-12-01");

        let second = &listings[1];
        assert_eq!(second.adress, "Körsbärsvägen 4");
        assert_eq!(second.apartment_number, "0412");
        assert_eq!(second.floor, 0);
        assert_eq!(second.square_meters, 18);
        assert_eq!(second.rent, 3_910);
        assert_eq!(second.move_in_date, "Omgående");
    }

    #[test]
    fn page_without_listings_is_empty() {
        assert!(parse_listings("<html><body><p>Inga lediga</p></body></html>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_field_fails_the_page() {
        let page = PAGE.replacen(r#"<dd class="ObjektHyra">3 910 kr</dd>"#, "", 1);
        let err = parse_listings(&page).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingElement { index: 1, selector: RENT }
        ));
    }

    #[test]
    fn missing_link_fails_the_page() {
        let page = PAGE.replacen(
            r#"<a href="https://sssb.se/objekt/1201">1 rum och kök</a>"#,
            "1 rum och kök",
            1,
        );
        assert!(matches!(
            parse_listings(&page).unwrap_err(),
            ParseError::MissingLink { index: 0 }
        ));
    }

    #[test]
    fn address_without_separator_fails_the_page() {
        let page = PAGE.replacen("Storgatan 1 / 1201", "Storgatan 1", 1);
        assert!(matches!(
            parse_listings(&page).unwrap_err(),
            ParseError::MalformedAddress { index: 0, .. }
        ));
    }
}
