//! Three full sale/trade cycles, each traded by an account with a deeper
//! referral chain: none, one referrer, two referrers.

use acdm_core::constants::{PAYMENT_UNIT, TRADABLE_UNIT};
use acdm_core::{Address, Amount, AssetLedger, TokenLedger};
use acdm_platform::*;

struct Market {
    engine: RoundEngine,
    acdm: TokenLedger,
    eth: TokenLedger,
    now: u64,
}

impl Market {
    fn new() -> Self {
        let engine = RoundEngine::new(
            Address::from("platform"),
            Address::from("dao"),
            RoundConfig::default(),
        );
        let mut acdm = TokenLedger::new("ACDMToken", "ACDM", 6);
        acdm.grant_minter(engine.address().clone());

        let faucet = Address::from("faucet");
        let mut eth = TokenLedger::new("Ether", "ETH", 18);
        eth.grant_minter(faucet.clone());
        for who in ["refer1", "refer2", "user", "buyer"] {
            eth.mint(&faucet, &Address::from(who), 1_000 * PAYMENT_UNIT)
                .unwrap();
        }

        Self {
            engine,
            acdm,
            eth,
            now: 1_650_000_000,
        }
    }

    fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }

    /// (referral owed, trade owed, platform revenue)
    fn books(&self) -> (Amount, Amount, Amount) {
        (
            self.engine.referral_owed(),
            self.engine.trade_owed(),
            self.engine.revenue(),
        )
    }
}

fn assert_conserved(before: (Amount, Amount, Amount), after: (Amount, Amount, Amount), payment: Amount) {
    let credited = (after.0 - before.0) + (after.1 - before.1);
    let retained = after.2 - before.2;
    assert!(credited <= payment, "credited {} exceeds payment {}", credited, payment);
    assert_eq!(credited + retained, payment, "payment must be fully accounted for");
}

#[test]
fn test_three_cycles_with_growing_referral_depth() {
    let mut m = Market::new();
    let refer1 = Address::from("refer1");
    let refer2 = Address::from("refer2");
    let user = Address::from("user");
    let buyer = Address::from("buyer");

    m.engine.register(&refer1, &refer2).unwrap();
    m.engine.register(&user, &refer1).unwrap();

    let cases: [(&Address, Option<&Address>, Option<&Address>); 3] = [
        (&refer2, None, None),
        (&refer1, Some(&refer2), None),
        (&user, Some(&refer1), Some(&refer2)),
    ];

    let mut expected_price = config::INITIAL_PRICE;
    let mut proceeds = config::INITIAL_TRADE_VOLUME;

    for (trader, tier1, tier2) in cases {
        // ---- sale phase ----
        let previous_price = expected_price;
        expected_price = expected_price * 103 / 100 + config::PRICE_INCREMENT;

        let round = m.engine.start_sale_round(m.now, &mut m.acdm).unwrap().clone();
        assert_eq!(round.number % 2, 1);
        assert_eq!(m.engine.phase(), Phase::Sale);
        assert_eq!(round.token_price, expected_price);
        assert!(round.token_price > previous_price);
        assert_eq!(round.token_minted, proceeds * TRADABLE_UNIT / expected_price);

        let whole_tokens = round.token_minted / 5 / TRADABLE_UNIT;
        assert!(whole_tokens > 0);
        let payment = whole_tokens * round.token_price;

        let tier1_before = tier1.map(|a| m.engine.earnings_of(a).referral_reward);
        let tier2_before = tier2.map(|a| m.engine.earnings_of(a).referral_reward);
        let books = m.books();

        let bought = m
            .engine
            .buy(trader, payment, m.now + 10, &mut m.acdm, &mut m.eth)
            .unwrap();
        assert_eq!(bought, whole_tokens * TRADABLE_UNIT);
        assert_conserved(books, m.books(), payment);

        if let (Some(account), Some(before)) = (tier1, tier1_before) {
            assert_eq!(
                m.engine.earnings_of(account).referral_reward,
                before + payment * m.engine.sale_reward1() / 1000
            );
        }
        if let (Some(account), Some(before)) = (tier2, tier2_before) {
            assert_eq!(
                m.engine.earnings_of(account).referral_reward,
                before + payment * m.engine.sale_reward2() / 1000
            );
        }

        // ---- trade phase ----
        m.advance(config::ROUND_TIME);
        m.engine.start_trade_round(m.now, &mut m.acdm).unwrap();
        assert_eq!(m.engine.phase(), Phase::Trade);
        assert_eq!(m.engine.round().trade_proceeds, 0);
        // only supply committed to open orders survives the burn
        assert_eq!(m.acdm.balance_of(m.engine.address()), m.engine.committed());

        let listed = m.acdm.balance_of(trader) / 2;
        let cost = round.token_price + 1_000_000;
        m.acdm.approve(trader, m.engine.address(), listed).unwrap();
        let order_id = m
            .engine
            .add_order(trader, listed, cost, m.now + 1, &mut m.acdm)
            .unwrap();

        let fill_tokens = listed / 2 / TRADABLE_UNIT;
        let fill_payment = cost * fill_tokens;
        let profit_before = m.engine.earnings_of(trader).trade_profit;
        let books = m.books();

        let delivered = m
            .engine
            .redeem_token(&buyer, order_id, fill_payment, m.now + 2, &mut m.acdm, &mut m.eth)
            .unwrap();
        assert_eq!(delivered, fill_tokens * TRADABLE_UNIT);
        assert_conserved(books, m.books(), fill_payment);

        let cut = fill_payment * m.engine.trade_reward() / 1000;
        assert_eq!(
            m.engine.earnings_of(trader).trade_profit,
            profit_before + fill_payment - 2 * cut
        );

        proceeds = fill_payment;
        assert_eq!(m.engine.round().trade_proceeds, proceeds);
        m.advance(config::ROUND_TIME);
    }

    assert_eq!(m.engine.round().number, 6);
    assert_eq!(m.engine.history().len(), 6);

    for order in m.engine.orders() {
        assert!(order.remaining_amount <= order.amount);
        assert!(order.settled() <= order.amount);
    }

    // lineage captured at registration never moves
    let link = m.engine.referrals_of(&user).unwrap();
    assert_eq!(link.referrer1, refer1);
    assert_eq!(link.referrer2.as_ref(), Some(&refer2));
    assert!(m.engine.register(&refer1, &user).is_err());
    assert_eq!(m.engine.referrals_of(&refer1).unwrap().referrer1, refer2);

    // withdrawn earnings leave the platform's payment balance
    let owed = m.engine.earnings_of(&refer2).referral_reward;
    let before = m.eth.balance_of(&refer2);
    m.engine.withdraw_referral_reward(&refer2, &mut m.eth).unwrap();
    assert_eq!(m.eth.balance_of(&refer2), before + owed);
}

#[test]
fn test_sale_cannot_restart_before_trade_window_ends() {
    let mut m = Market::new();
    m.engine.start_sale_round(m.now, &mut m.acdm).unwrap();
    m.advance(config::ROUND_TIME);
    m.engine.start_trade_round(m.now, &mut m.acdm).unwrap();

    assert!(matches!(
        m.engine.start_trade_round(m.now + 1, &mut m.acdm),
        Err(PlatformError::TradeAlreadyStarted)
    ));
    assert!(matches!(
        m.engine.start_sale_round(m.now + config::ROUND_TIME - 1, &mut m.acdm),
        Err(PlatformError::TradeNotFinished { .. })
    ));
    // an expired trade window rejects orders even before the next sale starts
    assert!(matches!(
        m.engine.add_order(&Address::from("user"), 1, 1, m.now + config::ROUND_TIME, &mut m.acdm),
        Err(PlatformError::WindowElapsed(Phase::Trade))
    ));

    // no fills happened, so the next sale mints nothing and can close at once
    let round = m
        .engine
        .start_sale_round(m.now + config::ROUND_TIME, &mut m.acdm)
        .unwrap()
        .clone();
    assert_eq!(round.token_minted, 0);
    assert!(m
        .engine
        .start_trade_round(m.now + config::ROUND_TIME + 1, &mut m.acdm)
        .is_ok());
}
