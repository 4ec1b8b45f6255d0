//! Integration tests for the DSC engine.
//!
//! These tests drive the engine through its public operations against
//! in-memory tokens and feeds, including misbehaving collaborators.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::*;
use dsc_engine::prelude::*;
use dsc_engine::utils::constants::{
    ADDITIONAL_FEED_PRECISION, FEED_PRECISION, LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD, MIN_HEALTH_FACTOR,
    ORACLE_TIMEOUT_SECS,
};

// ═══════════════════════════════════════════════════════════════════════════════
// CONSTRUCTOR TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_reverts_if_token_length_doesnt_match_price_feeds() {
    let weth: Arc<dyn FungibleToken> =
        Arc::new(InMemoryToken::new(Address::from_label("weth"), "Wrapped Ether", "WETH"));
    let feeds: Vec<Arc<dyn PriceFeed>> = vec![
        Arc::new(MockPriceFeed::new(Address::from_label("eth-usd"), 8, ETH_USD_PRICE, NOW)),
        Arc::new(MockPriceFeed::new(Address::from_label("btc-usd"), 8, BTC_USD_PRICE, NOW)),
    ];
    let dsc = Arc::new(StableCoin::new(Address::from_label("dsc"), engine_address()));

    let err = DscEngine::new(engine_address(), vec![weth], feeds, dsc).unwrap_err();
    assert_eq!(
        err,
        Error::TokenAddressesAndPriceFeedAddressesMustBeSameLength { tokens: 1, feeds: 2 }
    );
}

#[test]
fn test_registry_getters() {
    let d = Deployment::new();
    assert_eq!(
        d.engine.get_collateral_tokens(),
        vec![d.weth.address(), d.wbtc.address()]
    );
    assert_eq!(
        d.engine.get_collateral_token_price_feed(&d.wbtc.address()).unwrap(),
        d.btc_usd.address()
    );
    assert_eq!(d.engine.get_dsc(), d.dsc.address());
    assert_eq!(d.engine.get_min_health_factor(), MIN_HEALTH_FACTOR);
    assert_eq!(d.engine.get_liquidation_threshold(), LIQUIDATION_THRESHOLD);
    assert_eq!(d.engine.get_liquidation_precision(), LIQUIDATION_PRECISION);
    assert_eq!(d.engine.get_liquidation_bonus(), 10);
    assert_eq!(d.engine.get_precision(), PRECISION);
    assert_eq!(d.engine.get_feed_precision(), FEED_PRECISION);
    assert_eq!(d.engine.get_additional_feed_precision(), ADDITIONAL_FEED_PRECISION);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_get_usd_value() {
    let d = Deployment::new();
    // 15 ETH * $2000 = $30,000
    let usd = d.engine.get_usd_value(&d.weth.address(), 15 * PRECISION).unwrap();
    assert_eq!(usd, 30_000 * PRECISION);
}

#[test]
fn test_get_token_amount_from_usd() {
    let d = Deployment::new();
    // $100 at $2000/ETH = 0.05 ETH
    let amount = d
        .engine
        .get_token_amount_from_usd(&d.weth.address(), 100 * PRECISION)
        .unwrap();
    assert_eq!(amount, PRECISION / 20);
}

#[test]
fn test_stale_price_blocks_pricing_but_not_deposits() {
    let d = Deployment::new();

    d.clock.advance(ORACLE_TIMEOUT_SECS);
    assert!(d.engine.get_usd_value(&d.weth.address(), PRECISION).is_ok());

    d.clock.advance(1);
    let err = d.engine.get_usd_value(&d.weth.address(), PRECISION).unwrap_err();
    assert!(matches!(
        err,
        Error::PriceUnavailable {
            reason: PriceFault::Stale { .. },
            ..
        }
    ));

    // Deposits never price collateral
    d.deposited_collateral();
    let err = d.engine.mint_dsc(user(), AMOUNT_TO_MINT).unwrap_err();
    assert_eq!(err.code(), 3001);
    assert_eq!(d.dsc.balance_of(&user()).unwrap(), 0);
}

#[test]
fn test_non_positive_price_is_rejected() {
    let d = Deployment::new();
    d.set_eth_price(0);
    let err = d.engine.get_usd_value(&d.weth.address(), PRECISION).unwrap_err();
    assert!(err.is_configuration_error());
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEPOSIT TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_reverts_if_collateral_zero() {
    let d = Deployment::new();
    let err = d.engine.deposit_collateral(user(), d.weth.address(), 0).unwrap_err();
    assert_eq!(err, Error::InvalidAmount);
}

#[test]
fn test_reverts_with_unapproved_collateral() {
    let d = Deployment::new();
    let ran = Address::from_label("ran");
    let err = d
        .engine
        .deposit_collateral(user(), ran, AMOUNT_COLLATERAL)
        .unwrap_err();
    assert_eq!(err, Error::UnsupportedToken(ran));
}

#[test]
fn test_can_deposit_collateral_and_get_account_info() {
    let d = Deployment::new();
    d.deposited_collateral();

    let info = d.engine.get_account_information(&user()).unwrap();
    assert_eq!(info.total_dsc_minted, 0);

    let expected_deposit = d
        .engine
        .get_token_amount_from_usd(&d.weth.address(), info.collateral_value_in_usd)
        .unwrap();
    assert_eq!(expected_deposit, AMOUNT_COLLATERAL);
    assert_eq!(d.weth.balance_of(&engine_address()).unwrap(), AMOUNT_COLLATERAL);
}

#[test]
fn test_can_deposit_without_minting() {
    let d = Deployment::new();
    d.deposited_collateral();
    assert_eq!(d.dsc.balance_of(&user()).unwrap(), 0);
    assert_eq!(
        d.engine.get_health_factor(&user()).unwrap(),
        HealthFactor::MAX
    );
}

#[test]
fn test_deposit_without_allowance_changes_nothing() {
    let d = Deployment::new();
    let stranger = Address::from_label("stranger");
    d.weth.mint_to(stranger, PRECISION).unwrap();

    let err = d
        .engine
        .deposit_collateral(stranger, d.weth.address(), PRECISION)
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientAllowance { .. }));
    assert_eq!(d.engine.get_collateral_balance_of_user(&stranger, &d.weth.address()).unwrap(), 0);
    assert!(d.engine.events().unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// MINT TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_reverts_if_minted_dsc_breaks_health_factor() {
    let d = Deployment::new();
    let price = (ETH_USD_PRICE as u128) * ADDITIONAL_FEED_PRECISION;
    let amount_to_mint = dsc_engine::utils::math::mul_div(AMOUNT_COLLATERAL, price, PRECISION).unwrap();

    let expected = d
        .engine
        .calculate_health_factor(
            amount_to_mint,
            d.engine.get_usd_value(&d.weth.address(), AMOUNT_COLLATERAL).unwrap(),
        )
        .unwrap();
    assert_eq!(expected.raw(), PRECISION / 2);

    let err = d
        .engine
        .deposit_collateral_and_mint_dsc(user(), d.weth.address(), AMOUNT_COLLATERAL, amount_to_mint)
        .unwrap_err();
    assert_eq!(err, Error::BreaksHealthFactor(expected.raw()));

    // Nothing moved
    assert_eq!(d.weth.balance_of(&user()).unwrap(), STARTING_ERC20_BALANCE);
    assert_eq!(d.engine.get_collateral_balance_of_user(&user(), &d.weth.address()).unwrap(), 0);
}

#[test]
fn test_can_mint_with_deposited_collateral() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();
    assert_eq!(d.dsc.balance_of(&user()).unwrap(), AMOUNT_TO_MINT);
    assert_eq!(d.engine.get_total_dsc_minted().unwrap(), AMOUNT_TO_MINT);
}

#[test]
fn test_reverts_if_mint_amount_is_zero() {
    let d = Deployment::new();
    d.deposited_collateral();
    assert_eq!(d.engine.mint_dsc(user(), 0).unwrap_err(), Error::InvalidAmount);
}

#[test]
fn test_can_mint_up_to_exact_minimum_health_factor() {
    let d = Deployment::new();
    d.deposited_collateral();
    // $20,000 collateral supports exactly $10,000 of debt
    d.engine.mint_dsc(user(), 10_000 * PRECISION).unwrap();
    assert_eq!(d.engine.get_health_factor(&user()).unwrap(), HealthFactor::MIN);
    assert!(matches!(d.engine.mint_dsc(user(), 1), Err(Error::BreaksHealthFactor(_))));
}

#[test]
fn test_mint_failed_rolls_back_deposit() {
    let weth = Arc::new(InMemoryToken::new(Address::from_label("weth"), "Wrapped Ether", "WETH"));
    let dsc = Arc::new(FailingMintStable::new(Address::from_label("dsc"), engine_address()));
    let (engine, _) = single_collateral_engine(weth.clone(), dsc.clone());

    weth.mint_to(user(), AMOUNT_COLLATERAL).unwrap();
    weth.approve(user(), engine_address(), AMOUNT_COLLATERAL).unwrap();

    let err = engine
        .deposit_collateral_and_mint_dsc(user(), weth.address(), AMOUNT_COLLATERAL, AMOUNT_TO_MINT)
        .unwrap_err();
    assert_eq!(err, Error::MintFailed);

    assert_eq!(weth.balance_of(&user()).unwrap(), AMOUNT_COLLATERAL);
    assert_eq!(weth.balance_of(&engine_address()).unwrap(), 0);
    let info = engine.get_account_information(&user()).unwrap();
    assert_eq!(info.total_dsc_minted, 0);
    assert_eq!(info.collateral_value_in_usd, 0);
    assert!(engine.events().unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// BURN TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_reverts_if_burn_amount_is_zero() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();
    assert_eq!(d.engine.burn_dsc(user(), 0).unwrap_err(), Error::InvalidAmount);
}

#[test]
fn test_cant_burn_more_than_user_has() {
    let d = Deployment::new();
    let err = d.engine.burn_dsc(user(), 1).unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance { .. }));
}

#[test]
fn test_can_burn_dsc() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();

    d.engine.burn_dsc(user(), AMOUNT_TO_MINT).unwrap();
    assert_eq!(d.dsc.balance_of(&user()).unwrap(), 0);
    assert_eq!(d.dsc.total_supply().unwrap(), 0);
    assert_eq!(d.engine.get_account_information(&user()).unwrap().total_dsc_minted, 0);
}

#[test]
fn test_burn_without_tokens_restores_debt() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();
    d.dsc.transfer(user(), liquidator(), AMOUNT_TO_MINT).unwrap();

    let err = d.engine.burn_dsc(user(), AMOUNT_TO_MINT).unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance { .. }));
    assert_eq!(d.engine.get_account_information(&user()).unwrap().total_dsc_minted, AMOUNT_TO_MINT);
}

// ═══════════════════════════════════════════════════════════════════════════════
// REDEEM TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_can_redeem_collateral() {
    let d = Deployment::new();
    d.deposited_collateral();

    d.engine
        .redeem_collateral(user(), d.weth.address(), AMOUNT_COLLATERAL)
        .unwrap();
    assert_eq!(d.weth.balance_of(&user()).unwrap(), STARTING_ERC20_BALANCE);
    assert_eq!(d.engine.get_collateral_balance_of_user(&user(), &d.weth.address()).unwrap(), 0);

    let events = d.engine.events().unwrap();
    assert_eq!(
        events.last(),
        Some(&EngineEvent::CollateralRedeemed {
            from: user(),
            to: user(),
            token: d.weth.address(),
            amount: AMOUNT_COLLATERAL,
        })
    );
}

#[test]
fn test_redeem_breaking_health_factor_reverts() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();

    let err = d
        .engine
        .redeem_collateral(user(), d.weth.address(), AMOUNT_COLLATERAL)
        .unwrap_err();
    assert_eq!(err, Error::BreaksHealthFactor(0));
    assert_eq!(
        d.engine.get_collateral_balance_of_user(&user(), &d.weth.address()).unwrap(),
        AMOUNT_COLLATERAL
    );
}

#[test]
fn test_cant_redeem_more_than_deposited() {
    let d = Deployment::new();
    d.deposited_collateral();
    let err = d
        .engine
        .redeem_collateral(user(), d.weth.address(), AMOUNT_COLLATERAL + 1)
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance { .. }));
}

#[test]
fn test_can_redeem_collateral_for_dsc() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();

    d.engine
        .redeem_collateral_for_dsc(user(), d.weth.address(), AMOUNT_COLLATERAL, AMOUNT_TO_MINT)
        .unwrap();
    assert_eq!(d.dsc.balance_of(&user()).unwrap(), 0);
    assert_eq!(d.weth.balance_of(&user()).unwrap(), STARTING_ERC20_BALANCE);
    assert_eq!(d.engine.get_total_dsc_minted().unwrap(), 0);
}

#[test]
fn test_declined_collateral_transfer_rolls_back() {
    let token = Arc::new(DecliningToken::new(Address::from_label("decl")));
    let dsc = Arc::new(StableCoin::new(Address::from_label("dsc"), engine_address()));
    let (engine, _) = single_collateral_engine(token.clone(), dsc);

    token.mint_to(user(), AMOUNT_COLLATERAL);
    token.approve(user(), engine_address(), Amount::MAX).unwrap();
    engine.deposit_collateral(user(), token.address(), AMOUNT_COLLATERAL).unwrap();

    token.decline_transfers.store(true, Ordering::SeqCst);
    let err = engine
        .redeem_collateral(user(), token.address(), AMOUNT_COLLATERAL)
        .unwrap_err();
    assert_eq!(err, Error::TransferFailed { token: token.address() });
    assert_eq!(
        engine.get_collateral_balance_of_user(&user(), &token.address()).unwrap(),
        AMOUNT_COLLATERAL
    );
    assert_eq!(engine.events().unwrap().len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH FACTOR TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_properly_reports_health_factor() {
    let d = Deployment::new();
    d.set_eth_price(1000_00000000);
    d.deposited_collateral_and_minted();

    // $10,000 collateral, 50% threshold, $100 debt
    assert_eq!(d.engine.get_health_factor(&user()).unwrap().raw(), 50 * PRECISION);
}

#[test]
fn test_health_factor_can_go_below_one() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();
    d.set_eth_price(18_00000000);

    let hf = d.engine.get_health_factor(&user()).unwrap();
    assert_eq!(hf.raw(), 9 * PRECISION / 10);
    assert!(hf.is_liquidatable());
}

// ═══════════════════════════════════════════════════════════════════════════════
// LIQUIDATION TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_cant_liquidate_good_health_factor() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();
    d.fund(liquidator(), 20 * PRECISION);
    d.engine
        .deposit_collateral_and_mint_dsc(liquidator(), d.weth.address(), 20 * PRECISION, AMOUNT_TO_MINT)
        .unwrap();

    let err = d
        .engine
        .liquidate(liquidator(), user(), d.weth.address(), AMOUNT_TO_MINT)
        .unwrap_err();
    assert_eq!(err, Error::HealthFactorOk);
}

#[test]
fn test_liquidation_payout_is_correct() {
    let d = Deployment::new();
    d.liquidatable();

    let seized = d
        .engine
        .liquidate(liquidator(), user(), d.weth.address(), AMOUNT_TO_MINT)
        .unwrap();

    let covered = d
        .engine
        .get_token_amount_from_usd(&d.weth.address(), AMOUNT_TO_MINT)
        .unwrap();
    let expected = covered + covered / 10;
    assert_eq!(seized, expected);
    assert_eq!(d.weth.balance_of(&liquidator()).unwrap(), expected);
    assert_eq!(
        d.engine.get_collateral_balance_of_user(&user(), &d.weth.address()).unwrap(),
        AMOUNT_COLLATERAL - expected
    );
}

#[test]
fn test_liquidation_clears_debt_and_burns_liquidator_dsc() {
    let d = Deployment::new();
    d.liquidatable();

    d.engine
        .liquidate(liquidator(), user(), d.weth.address(), AMOUNT_TO_MINT)
        .unwrap();

    assert_eq!(d.engine.get_account_information(&user()).unwrap().total_dsc_minted, 0);
    assert_eq!(d.engine.get_health_factor(&user()).unwrap(), HealthFactor::MAX);
    assert_eq!(d.dsc.balance_of(&liquidator()).unwrap(), 0);
    // The liquidator's own debt is untouched
    assert_eq!(
        d.engine.get_account_information(&liquidator()).unwrap().total_dsc_minted,
        AMOUNT_TO_MINT
    );
    assert_eq!(d.engine.get_total_dsc_minted().unwrap(), d.dsc.total_supply().unwrap());

    let events = d.engine.drain_events().unwrap();
    let tail: Vec<&str> = events.iter().rev().take(3).map(|e| e.event_type()).collect();
    assert_eq!(tail, vec!["Liquidated", "DscBurned", "CollateralRedeemed"]);
}

#[test]
fn test_liquidation_must_improve_health_factor() {
    let d = Deployment::new();
    d.liquidatable();
    // Collateral now worth exactly the debt; the bonus makes things worse
    d.set_eth_price(10_00000000);

    let err = d
        .engine
        .liquidate(liquidator(), user(), d.weth.address(), 10 * PRECISION)
        .unwrap_err();
    assert_eq!(err, Error::HealthFactorNotImproved);
    assert_eq!(d.dsc.balance_of(&liquidator()).unwrap(), AMOUNT_TO_MINT);
    assert_eq!(
        d.engine.get_collateral_balance_of_user(&user(), &d.weth.address()).unwrap(),
        AMOUNT_COLLATERAL
    );
}

#[test]
fn test_liquidator_must_stay_healthy() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();

    let collateral = 20 * PRECISION;
    d.fund(liquidator(), collateral);
    d.engine
        .deposit_collateral_and_mint_dsc(liquidator(), d.weth.address(), collateral, 180 * PRECISION)
        .unwrap();
    d.set_eth_price(17_00000000);

    let err = d
        .engine
        .liquidate(liquidator(), user(), d.weth.address(), 50 * PRECISION)
        .unwrap_err();
    assert!(matches!(err, Error::BreaksHealthFactor(hf) if hf < MIN_HEALTH_FACTOR));
    assert_eq!(d.dsc.balance_of(&liquidator()).unwrap(), 180 * PRECISION);
}

#[test]
fn test_cant_cover_more_than_account_debt() {
    let d = Deployment::new();
    d.liquidatable();
    let err = d
        .engine
        .liquidate(liquidator(), user(), d.weth.address(), AMOUNT_TO_MINT + 1)
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance { .. }));
}

#[test]
fn test_configured_liquidation_bonus() {
    let d = Deployment::with_config(EngineConfig::default().with_liquidation_bonus(5));
    d.liquidatable();

    let covered = d
        .engine
        .get_token_amount_from_usd(&d.weth.address(), AMOUNT_TO_MINT)
        .unwrap();
    let seized = d
        .engine
        .liquidate(liquidator(), user(), d.weth.address(), AMOUNT_TO_MINT)
        .unwrap();
    assert_eq!(seized, covered + covered * 5 / 100);
}

#[test]
fn test_self_liquidation_keeps_remaining_collateral() {
    let d = Deployment::new();
    d.deposited_collateral_and_minted();
    d.set_eth_price(18_00000000);

    let debt_to_cover = 50 * PRECISION;
    let seized = d
        .engine
        .liquidate(user(), user(), d.weth.address(), debt_to_cover)
        .unwrap();

    let covered = d
        .engine
        .get_token_amount_from_usd(&d.weth.address(), debt_to_cover)
        .unwrap();
    assert_eq!(seized, covered + covered / 10);

    let remaining = d
        .engine
        .get_collateral_balance_of_user(&user(), &d.weth.address())
        .unwrap();
    assert_eq!(remaining, AMOUNT_COLLATERAL - seized);
    assert_eq!(d.weth.balance_of(&engine_address()).unwrap(), remaining);
    assert_eq!(d.weth.balance_of(&user()).unwrap(), seized);

    let info = d.engine.get_account_information(&user()).unwrap();
    assert_eq!(info.total_dsc_minted, AMOUNT_TO_MINT - debt_to_cover);
    assert_eq!(d.dsc.balance_of(&user()).unwrap(), AMOUNT_TO_MINT - debt_to_cover);
    assert!(d.engine.get_health_factor(&user()).unwrap().is_healthy());
}

#[test]
fn test_liquidation_leaves_liquidator_collateral_untouched() {
    let d = Deployment::new();
    d.liquidatable();

    let seized = d
        .engine
        .liquidate(liquidator(), user(), d.weth.address(), AMOUNT_TO_MINT)
        .unwrap();

    let liquidator_collateral = d
        .engine
        .get_collateral_balance_of_user(&liquidator(), &d.weth.address())
        .unwrap();
    let user_collateral = d
        .engine
        .get_collateral_balance_of_user(&user(), &d.weth.address())
        .unwrap();
    assert_eq!(liquidator_collateral, 20 * PRECISION);
    assert_eq!(user_collateral, AMOUNT_COLLATERAL - seized);
    assert_eq!(
        d.weth.balance_of(&engine_address()).unwrap(),
        liquidator_collateral + user_collateral
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// REENTRANCY TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_reentrant_call_is_rejected() {
    let token = Arc::new(ReentrantToken::new(Address::from_label("reent")));
    let dsc = Arc::new(StableCoin::new(Address::from_label("dsc"), engine_address()));
    let (engine, _) = single_collateral_engine(token.clone(), dsc);
    let engine = Arc::new(engine);
    token.attach(&engine);

    token.mint_to(user(), AMOUNT_COLLATERAL);
    token.approve(user(), engine_address(), Amount::MAX).unwrap();

    engine
        .deposit_collateral(user(), token.address(), AMOUNT_COLLATERAL)
        .unwrap();

    let reentries = token.reentry_results.lock().unwrap();
    assert_eq!(reentries.as_slice(), &[Err(Error::Reentrancy)]);
    // Queries from inside the call see committed state only
    assert_eq!(token.observed_balances.lock().unwrap().as_slice(), &[0]);
    assert_eq!(
        engine.get_collateral_balance_of_user(&user(), &token.address()).unwrap(),
        AMOUNT_COLLATERAL
    );
}

#[test]
fn test_concurrent_callers_are_serialized() {
    let d = Deployment::new();
    d.fund(liquidator(), STARTING_ERC20_BALANCE);

    std::thread::scope(|scope| {
        let workers: Vec<_> = [user(), liquidator()]
            .into_iter()
            .map(|account| {
                let engine = Arc::clone(&d.engine);
                let weth = d.weth.address();
                scope.spawn(move || {
                    (0..10)
                        .map(|_| engine.deposit_collateral(account, weth, PRECISION))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for worker in workers {
            assert!(worker.join().unwrap().iter().all(|result| result.is_ok()));
        }
    });

    for account in [user(), liquidator()] {
        assert_eq!(
            d.engine.get_collateral_balance_of_user(&account, &d.weth.address()).unwrap(),
            STARTING_ERC20_BALANCE
        );
    }
    assert_eq!(d.weth.balance_of(&engine_address()).unwrap(), 2 * STARTING_ERC20_BALANCE);
}

// ═══════════════════════════════════════════════════════════════════════════════
// WALL-CLOCK DEPLOYMENT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_default_engine_prices_fresh_wall_clock_rounds() {
    let weth = Arc::new(InMemoryToken::new(Address::from_label("weth"), "Wrapped Ether", "WETH"));
    let feed = Arc::new(MockPriceFeed::new_now(Address::from_label("eth-usd"), 8, ETH_USD_PRICE));
    let dsc = Arc::new(StableCoin::new(Address::from_label("dsc"), engine_address()));
    let tokens: Vec<Arc<dyn FungibleToken>> = vec![weth.clone()];
    let feeds: Vec<Arc<dyn PriceFeed>> = vec![feed.clone()];
    let engine = DscEngine::new(engine_address(), tokens, feeds, dsc).unwrap();

    assert_eq!(engine.config(), &EngineConfig::default());
    assert_eq!(engine.get_usd_value(&weth.address(), PRECISION).unwrap(), 2000 * PRECISION);

    feed.update_answer(1000_00000000).unwrap();
    assert_eq!(engine.get_usd_value(&weth.address(), PRECISION).unwrap(), 1000 * PRECISION);
}
