#![cfg(test)]

use crate::{GridError, GridMapContract, GridMapContractClient, WORD_BITS};
use soroban_sdk::{vec, Env, Vec, U256};

fn setup(env: &Env) -> GridMapContractClient<'_> {
    let contract_id = env.register(GridMapContract, ());
    GridMapContractClient::new(env, &contract_id)
}

fn empty_map(env: &Env, words: u32) -> Vec<U256> {
    let mut map = Vec::new(env);
    for _ in 0..words {
        map.push_back(U256::from_u32(env, 0));
    }
    map
}

#[test]
fn test_calc_size() {
    let env = Env::default();
    let client = setup(&env);

    // 5x5 = 25 bits fit in one word.
    assert_eq!(client.calc_size(&5), 1);
    // 25x25 = 625 bits need three 251-bit words.
    assert_eq!(client.calc_size(&25), 3);
    assert_eq!(client.word_bits(), WORD_BITS);
}

#[test]
fn test_calc_size_zero_rejected() {
    let env = Env::default();
    let client = setup(&env);

    assert_eq!(client.try_calc_size(&0), Err(Ok(GridError::InvalidSize)));
}

#[test]
fn test_set_then_get_across_words() {
    let env = Env::default();
    let client = setup(&env);
    let map = empty_map(&env, 3);

    let map = client.set_bit(&25, &map, &0);
    let map = client.set_bit(&25, &map, &251);
    let map = client.set_bit(&25, &map, &624);

    assert_eq!(client.get_bit(&25, &map, &0), 1);
    assert_eq!(client.get_bit(&25, &map, &251), 1);
    assert_eq!(client.get_bit(&25, &map, &624), 1);
    assert_eq!(client.get_bit(&25, &map, &1), 0);
    assert_eq!(client.get_bit(&25, &map, &250), 0);

    // Position 251 is bit 0 of word 1; position 624 is bit 122 of word 2.
    assert_eq!(map.get(1).unwrap(), U256::from_u32(&env, 1));
    assert_eq!(
        map.get(2).unwrap(),
        U256::from_u32(&env, 1).shl(122)
    );
}

#[test]
fn test_set_bit_is_idempotent() {
    let env = Env::default();
    let client = setup(&env);
    let map = empty_map(&env, 1);

    let once = client.set_bit(&5, &map, &3);
    let twice = client.set_bit(&5, &once, &3);
    assert_eq!(once, twice);
    assert_eq!(twice.get(0).unwrap(), U256::from_u32(&env, 8));
}

#[test]
fn test_clear_bit() {
    let env = Env::default();
    let client = setup(&env);
    let map = vec![&env, U256::from_u32(&env, 0b1010)];

    let map = client.clear_bit(&5, &map, &3);
    assert_eq!(map.get(0).unwrap(), U256::from_u32(&env, 0b0010));
    let map = client.clear_bit(&5, &map, &3);
    assert_eq!(map.get(0).unwrap(), U256::from_u32(&env, 0b0010));
}

#[test]
fn test_position_out_of_range() {
    let env = Env::default();
    let client = setup(&env);
    let map = empty_map(&env, 1);

    assert_eq!(
        client.try_get_bit(&5, &map, &25),
        Err(Ok(GridError::PositionOutOfRange))
    );
    assert_eq!(
        client.try_set_bit(&5, &map, &25),
        Err(Ok(GridError::PositionOutOfRange))
    );
}

#[test]
fn test_short_map_rejected() {
    let env = Env::default();
    let client = setup(&env);
    let map = empty_map(&env, 2);

    assert_eq!(
        client.try_set_bit(&25, &map, &600),
        Err(Ok(GridError::MapTooShort))
    );

    // The addressed word exists, the map is still one word short.
    assert_eq!(
        client.try_get_bit(&25, &map, &0),
        Err(Ok(GridError::MapTooShort))
    );
    assert_eq!(
        client.try_set_bit(&25, &map, &0),
        Err(Ok(GridError::MapTooShort))
    );
    assert_eq!(
        client.try_clear_bit(&25, &map, &0),
        Err(Ok(GridError::MapTooShort))
    );
}

#[test]
fn test_overflowing_word_rejected() {
    let env = Env::default();
    let client = setup(&env);
    let map = vec![&env, U256::from_u32(&env, 1).shl(WORD_BITS)];

    assert_eq!(
        client.try_set_bit(&5, &map, &0),
        Err(Ok(GridError::WordOverflow))
    );
}
