//! End-to-end tests of capture, filtering and lookups on a simulated memory space

use pretty_assertions::assert_eq;
use ram_search::{
    Address, ComparisonType, FilterType, MemSize, MemoryImage, SearchFilter, SearchMatch,
    SearchSession, WordType,
};

fn counter_image() -> MemoryImage {
    MemoryImage::new(64).with_bytes(Address::new(0x10), &[0xFF, 0x00])
}

fn addresses(session: &SearchSession) -> Vec<u64> {
    session.iter_matches().map(|m| m.address.as_u64()).collect()
}

#[test]
fn test_capture_at_end_of_address_space() {
    let image = MemoryImage::new(0x1_0000_0000);
    let session = SearchSession::fresh(
        &image,
        Address::new(0xFFFF_FFF0),
        0x100,
        WordType::EightBit,
    );

    assert_eq!(session.matching_address_count(), 16);
    assert_eq!(
        session.matching_address(15).map(|m| m.address),
        Some(Address::new(0xFFFF_FFFF))
    );
    assert_eq!(session.matching_address(16), None);
}

#[test]
fn test_exclude_leaves_sibling_sessions_alone() {
    let image = MemoryImage::new(40)
        .with_bytes(Address::new(10), &[0x55])
        .with_bytes(Address::new(20), &[0x55])
        .with_bytes(Address::new(30), &[0x55]);
    let parent = SearchSession::fresh(&image, Address::new(0), 40, WordType::EightBit);
    let filter = SearchFilter::constant(ComparisonType::Equals, 0x55);

    let mut first = SearchSession::filtered(&parent, &image, filter.clone());
    let second = SearchSession::filtered(&parent, &image, filter);
    assert_eq!(addresses(&first), vec![10, 20, 30]);

    assert!(first.exclude_address(Address::new(20)));
    assert!(!first.exclude_address(Address::new(20)));
    assert_eq!(addresses(&first), vec![10, 30]);
    assert_eq!(addresses(&second), vec![10, 20, 30]);
    assert_eq!(parent.matching_address_count(), 40);

    assert!(first.exclude_at_index(1));
    assert_eq!(addresses(&first), vec![10]);
    assert!(!first.exclude_at_index(1));
}

#[test]
fn test_nibbles_are_independent() {
    let image = MemoryImage::new(0x200).with_bytes(Address::new(0x100), &[0x3A]);
    let session = SearchSession::fresh(&image, Address::new(0x100), 1, WordType::FourBit);

    assert_eq!(
        session.value_at(Address::new(0x100), MemSize::NibbleLower),
        Some(SearchMatch::new(Address::new(0x100), 0xA, MemSize::NibbleLower))
    );
    assert_eq!(
        session.value_at(Address::new(0x100), MemSize::NibbleUpper),
        Some(SearchMatch::new(Address::new(0x100), 0x3, MemSize::NibbleUpper))
    );

    let high = SearchSession::filtered(
        &session,
        &image,
        SearchFilter::constant(ComparisonType::Equals, 3),
    );
    assert_eq!(
        high.iter_matches().collect::<Vec<_>>(),
        vec![SearchMatch::new(Address::new(0x100), 0x3, MemSize::NibbleUpper)]
    );
    assert_eq!(high.formatted_value(Address::new(0x100), MemSize::NibbleUpper), "0x3");
}

#[test]
fn test_aligned_candidates() {
    let image = MemoryImage::from_bytes((0u8..32).collect());

    let session = SearchSession::fresh(&image, Address::new(1), 20, WordType::ThirtyTwoBitAligned);
    assert_eq!(addresses(&session), vec![4, 8, 12, 16]);
    assert_eq!(session.matching_address_count(), 4);

    let session = SearchSession::fresh(
        &image,
        Address::new(1),
        10,
        WordType::SixteenBitBigEndianAligned,
    );
    assert_eq!(addresses(&session), vec![2, 4, 6, 8]);
    assert_eq!(session.matching_address(0).map(|m| m.value), Some(0x0203));
    assert!(!session.contains_address(Address::new(3)));
}

#[test]
fn test_counter_found_with_last_known_plus() {
    let mut image = counter_image();
    let fresh = SearchSession::fresh(&image, Address::new(0), 64, WordType::SixteenBit);
    assert_eq!(fresh.matching_address_count(), 63);

    image.write(Address::new(0x10), &[0x00, 0x01]);
    let plus_one = SearchFilter::last_known_plus(ComparisonType::Equals, 1);
    let first = SearchSession::filtered(&fresh, &image, plus_one.clone());
    assert_eq!(addresses(&first), vec![0x10, 0x11]);
    assert_eq!(first.summary(), "Filtering for EQUAL last known value plus 1...");

    image.write(Address::new(0x10), &[0x01, 0x01]);
    let second = SearchSession::filtered(&first, &image, plus_one);
    assert_eq!(addresses(&second), vec![0x10]);
    assert_eq!(second.formatted_value(Address::new(0x10), MemSize::SixteenBit), "0x0101");
}

#[test]
fn test_minus_wraps_in_32_bits() {
    let mut image = MemoryImage::new(4);
    let fresh = SearchSession::fresh(&image, Address::new(0), 4, WordType::EightBit);

    image.write_u8(Address::new(2), 0xFF);
    let filtered = SearchSession::filtered(
        &fresh,
        &image,
        SearchFilter::last_known_minus(ComparisonType::Equals, 1),
    );
    // 0 - 1 wraps to 0xFFFFFFFF, which an 8-bit value never equals
    assert_eq!(filtered.matching_address_count(), 0);
}

#[test]
fn test_float_search() {
    let mut image = MemoryImage::new(16).with_bytes(Address::new(4), &1.5f32.to_le_bytes());
    let fresh = SearchSession::fresh(&image, Address::new(0), 16, WordType::Float);
    assert_eq!(fresh.matching_address_count(), 13);

    image.write(Address::new(4), &2.5f32.to_le_bytes());
    let increased = SearchSession::filtered(
        &fresh,
        &image,
        SearchFilter::last_known(ComparisonType::GreaterThan),
    );
    assert!(increased.contains_address(Address::new(4)));

    let exact = SearchSession::filtered(
        &increased,
        &image,
        SearchFilter::constant_float(ComparisonType::Equals, 2.5),
    );
    assert_eq!(addresses(&exact), vec![4]);
    assert_eq!(exact.formatted_value(Address::new(4), MemSize::Float), "2.5");
    assert_eq!(
        exact.matching_address(0).map(|m| m.value),
        Some(2.5f32.to_bits())
    );
}

#[test]
fn test_big_endian_words() {
    let image = MemoryImage::from_bytes(vec![0x12, 0x34, 0x56, 0x78]);
    let session = SearchSession::fresh(&image, Address::new(0), 4, WordType::ThirtyTwoBitBigEndian);
    let filtered = SearchSession::filtered(
        &session,
        &image,
        SearchFilter::constant(ComparisonType::Equals, 0x12345678),
    );

    assert_eq!(addresses(&filtered), vec![0]);
    assert_eq!(
        filtered.formatted_value(Address::new(0), MemSize::ThirtyTwoBitBigEndian),
        "0x12345678",
    );
}

#[test]
fn test_merge_with_itself_matches_plain_filter() {
    let mut image = counter_image();
    let session = SearchSession::fresh(&image, Address::new(0), 64, WordType::SixteenBit);
    let copy = session.clone();
    image.write_u8(Address::new(0x20), 7);

    let filter = SearchFilter::last_known(ComparisonType::NotEqualTo);
    let plain = SearchSession::filtered(&session, &image, filter.clone());
    let identical = SearchSession::filtered_merged(&session, &session, &image, filter.clone());
    let merged = SearchSession::filtered_merged(&copy, &session, &image, filter);

    assert_eq!(identical, plain);
    assert_eq!(merged, plain);
    assert_eq!(addresses(&plain), vec![0x1F, 0x20]);
}

#[test]
fn test_initial_value_matches_last_known_value() {
    let mut image = counter_image();
    let fresh = SearchSession::fresh(&image, Address::new(0), 64, WordType::EightBit);
    image.write_u8(Address::new(0x11), 0x40);
    image.write_u8(Address::new(0x30), 0x01);

    let initial = SearchSession::filtered(
        &fresh,
        &image,
        SearchFilter::initial(ComparisonType::GreaterThan),
    );
    let last_known = SearchSession::filtered(
        &fresh,
        &image,
        SearchFilter::last_known(ComparisonType::GreaterThan),
    );

    assert_eq!(initial.filter_type(), FilterType::InitialValue);
    assert_eq!(initial.matching_addresses(), last_known.matching_addresses());
    assert_eq!(initial.blocks(), last_known.blocks());
    assert_eq!(addresses(&initial), vec![0x11, 0x30]);
}

#[test]
fn test_session_from_matches_can_be_refiltered() {
    let session = SearchSession::from_matches(
        &[
            SearchMatch::new(Address::new(0x20), 8, MemSize::EightBit),
            SearchMatch::new(Address::new(0x10), 5, MemSize::EightBit),
        ],
        WordType::EightBit,
    );
    assert_eq!(session.summary(), "Filtering for EQUAL last known value...");

    let image = MemoryImage::new(0x40)
        .with_bytes(Address::new(0x10), &[5])
        .with_bytes(Address::new(0x20), &[9]);
    let unchanged = SearchSession::filtered(
        &session,
        &image,
        SearchFilter::last_known(ComparisonType::Equals),
    );
    assert_eq!(addresses(&unchanged), vec![0x10]);
}

#[test]
fn test_lookups_outside_the_session() {
    let image = counter_image();
    let session = SearchSession::fresh(&image, Address::new(0x10), 8, WordType::SixteenBit);

    assert_eq!(session.value_at(Address::new(0x0F), MemSize::SixteenBit), None);
    assert_eq!(session.value_at(Address::new(0x17), MemSize::SixteenBit), None);
    assert_eq!(session.formatted_value(Address::new(0x40), MemSize::SixteenBit), "");
    assert!(!session.contains_address(Address::new(0x17)));
    assert!(session.contains_address(Address::new(0x16)));

    let mut buffer = [0xEEu8; 4];
    assert!(!session.get_bytes(Address::new(0x16), &mut buffer));
    assert_eq!(buffer, [0, 0, 0, 0]);
}

#[test]
fn test_update_value_tracks_live_memory() {
    let mut image = counter_image();
    let session = SearchSession::fresh(&image, Address::new(0x10), 2, WordType::SixteenBit);
    let mut m = session
        .matching_address(0)
        .expect("one candidate at 0x10");
    assert_eq!(m.value, 0x00FF);

    image.write(Address::new(0x10), &[0x34, 0x12]);
    assert!(session.update_value(&mut m, &image));
    assert_eq!(m.value, 0x1234);
    assert!(!session.update_value(&mut m, &image));
}
