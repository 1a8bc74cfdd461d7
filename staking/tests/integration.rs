use acdm_core::{Address, AssetLedger, TokenLedger};
use acdm_staking::*;

const FREEZE: u64 = 604_800;
const START: u64 = 1_650_000_000;

fn setup(stakers: &[(&str, u128)]) -> (StakingLedger, TokenLedger, TokenLedger) {
    let pool = Address::from("uniswap-pair");
    let staking = StakingLedger::new(
        Address::from("staking"),
        Address::from("dao"),
        StakingConfig {
            freezing_time: FREEZE,
            percents: 3,
        },
    );

    let mut lp = TokenLedger::new("Uniswap V2", "UNI-V2", 18);
    lp.grant_minter(pool.clone());
    for (name, amount) in stakers {
        let account = Address::from(*name);
        lp.mint(&pool, &account, *amount).unwrap();
        lp.approve(&account, staking.address(), *amount).unwrap();
    }

    let mut xxx = TokenLedger::new("XXXToken", "XXX", 18);
    xxx.grant_minter(staking.address().clone());

    (staking, lp, xxx)
}

#[test]
fn test_reward_paid_is_monotonic_across_cycles() {
    let (mut staking, mut lp, mut xxx) = setup(&[("voter1", 10_000)]);
    let voter = Address::from("voter1");
    staking.stake(&voter, 10_000, START, &mut lp).unwrap();

    let mut last_paid = 0;
    let mut total = 0;
    for cycle in 1..=4u64 {
        let now = START + cycle * FREEZE + 17;
        total += staking.claim(&voter, now, &mut xxx).unwrap();

        let paid = staking.stake_of(&voter).unwrap().reward_paid;
        assert!(paid > last_paid, "reward_paid must grow every cycle");
        last_paid = paid;

        assert!(matches!(
            staking.claim(&voter, now, &mut xxx),
            Err(StakingError::NoReward)
        ));
    }

    // 100 * 3 per cycle over four cycles
    assert_eq!(total, 1_200);
    assert_eq!(xxx.balance_of(&voter), 1_200);
    assert_eq!(xxx.total_supply(), 1_200);
}

#[test]
fn test_unstake_returns_principal_and_clears_record() {
    let (mut staking, mut lp, mut xxx) = setup(&[("voter1", 700), ("voter2", 300)]);
    let voter1 = Address::from("voter1");
    let voter2 = Address::from("voter2");

    staking.stake(&voter1, 700, START, &mut lp).unwrap();
    staking.stake(&voter2, 300, START, &mut lp).unwrap();
    assert_eq!(staking.total_staked(), 1_000);

    assert!(matches!(
        staking.unstake(&voter1, START + FREEZE - 1, &mut lp),
        Err(StakingError::StillFrozen { .. })
    ));

    assert_eq!(staking.unstake(&voter1, START + FREEZE, &mut lp).unwrap(), 700);
    assert_eq!(lp.balance_of(&voter1), 700);
    assert_eq!(staking.total_staked(), 300);
    assert!(staking.stake_of(&voter1).is_none());
    assert_eq!(staking.principal_of(&voter1), 0);

    assert!(matches!(
        staking.claim(&voter1, START + FREEZE, &mut xxx),
        Err(StakingError::NoStake(_))
    ));
}
