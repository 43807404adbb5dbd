use realms_core::constants::DEFAULT_WORD_BITS;
use realms_core::{
    calc_size, clear_bit, get_bit, set_bit, BitmapGrid, GridError, GridLayout, Word,
};

#[test]
fn capacity_is_monotonic_in_size() {
    for word_bits in [1, 8, 64, 251, 256] {
        let mut previous = 0;
        for size in 1..=64 {
            let words = calc_size(size, word_bits).unwrap();
            assert!(
                words >= previous,
                "calc_size({size}, {word_bits}) = {words} < {previous}"
            );
            assert!(u64::from(words) * u64::from(word_bits) >= u64::from(size * size));
            previous = words;
        }
    }
}

#[test]
fn set_then_get_round_trips_for_every_position() {
    let layout = GridLayout::with_default_width(25).unwrap();
    let empty = vec![Word::ZERO; layout.word_count() as usize];

    for position in 0..layout.cell_count() {
        let updated = set_bit(&empty, &layout, position).unwrap();
        assert!(get_bit(&updated, &layout, position).unwrap());

        let total: u32 = updated.iter().map(Word::count_ones).sum();
        assert_eq!(total, 1, "set_bit({position}) touched other bits");
        assert!(updated.iter().all(|w| w.fits_in(DEFAULT_WORD_BITS)));
    }
}

#[test]
fn set_bit_leaves_other_positions_alone() {
    let layout = GridLayout::with_default_width(25).unwrap();
    let mut words = vec![Word::ZERO; 3];
    for position in [0, 7, 250, 251, 400, 624] {
        words = set_bit(&words, &layout, position).unwrap();
    }
    let before: Vec<bool> = (0..625)
        .map(|p| get_bit(&words, &layout, p).unwrap())
        .collect();

    let after_words = set_bit(&words, &layout, 300).unwrap();
    for position in 0..625u64 {
        let expected = position == 300 || before[position as usize];
        assert_eq!(get_bit(&after_words, &layout, position).unwrap(), expected);
    }
}

#[test]
fn positions_past_the_grid_are_rejected() {
    let layout = GridLayout::with_default_width(5).unwrap();
    let words = vec![Word::ZERO; 1];
    let expected = GridError::PositionOutOfRange {
        position: 25,
        cell_count: 25,
    };
    assert_eq!(get_bit(&words, &layout, 25), Err(expected));
    assert_eq!(set_bit(&words, &layout, 25), Err(expected));
    assert!(get_bit(&words, &layout, 24).is_ok());
}

#[test]
fn bitmap_grid_refuses_short_maps() {
    let layout = GridLayout::with_default_width(25).unwrap();
    assert_eq!(
        BitmapGrid::from_words(layout, vec![Word::ZERO; 2]),
        Err(GridError::MapTooShort {
            expected: 3,
            actual: 2
        })
    );
}

#[test]
fn bit_operations_refuse_short_maps() {
    let layout = GridLayout::with_default_width(25).unwrap();
    let words = vec![Word::ZERO; 1];
    let short = GridError::MapTooShort {
        expected: 3,
        actual: 1,
    };
    assert_eq!(get_bit(&words, &layout, 0), Err(short));
    assert_eq!(set_bit(&words, &layout, 0), Err(short));
    assert_eq!(clear_bit(&words, &layout, 0), Err(short));
}

#[test]
fn bitmap_grid_tracks_cells() {
    let layout = GridLayout::new(6, 8).unwrap();
    let mut grid = BitmapGrid::new(layout);
    assert_eq!(grid.words().len(), 5);

    grid.set_cell(0, 0).unwrap();
    grid.set_cell(2, 3).unwrap();
    grid.set_cell(5, 5).unwrap();
    assert!(grid.get_cell(2, 3).unwrap());
    assert!(!grid.get_cell(3, 2).unwrap());
    assert_eq!(grid.count_set(), 3);

    grid.clear(layout.position_of(2, 3).unwrap()).unwrap();
    assert!(!grid.get_cell(2, 3).unwrap());
    assert_eq!(grid.count_set(), 2);

    // (5, 5) is position 35: word 4, bit 3.
    assert_eq!(grid.words()[4], Word::from(8u64));
}
