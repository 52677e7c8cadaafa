// Gambling commands. The stake is validated before anything touches the
// store; the round's profit is applied as one signed balance change.

use crate::core::dispatch::{BoxFuture, Error, Reply};
use crate::core::economy::{check_stake, parse_currency_amount};
use crate::core::gambling::{flip_coin, play_rps, CoinSide, Hand, Outcome, Round};
use crate::discord::data::Context;
use crate::discord::responses::{card, respond, usage, GAMBLING};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Display;

const THUMBNAIL: &str = "https://i.imgur.com/BvnksIe.png";

/// Validated stake for the amount in `ctx.arg(1)`, or the reply refusing it.
fn stake(ctx: &Context<'_>) -> Result<Result<i64, Reply>, Error> {
    let balance = ctx.profile()?.balance;
    let amount = parse_currency_amount(balance, ctx.arg(1)).ok();
    Ok(check_stake(balance, amount).map_err(|e| respond(ctx, "Bet", GAMBLING, e.to_string())))
}

async fn settle<T: Display>(ctx: &Context<'_>, round: Round<T>) -> Result<Reply, Error> {
    let author = ctx.author().id;
    ctx.data.economy.credit(author, round.profit).await?;

    let balance = round.balance_after(ctx.profile()?.balance);
    let result = match round.outcome {
        Outcome::Tied => "It's a tie".to_string(),
        outcome => format!("You've {} {}", outcome, round.profit.abs()),
    };
    let embed = card(ctx, GAMBLING).thumbnail(THUMBNAIL).field(
        "Result",
        format!(
            "Outcome was **{}**\n{}\nYour balance now is :dollar: {}",
            round.rolled, result, balance
        ),
        false,
    );
    Ok(embed.into())
}

pub fn coinflip(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        let Some(side) = ctx.arg(0).and_then(CoinSide::parse) else {
            return Ok(usage(&ctx, GAMBLING));
        };
        let stake = match stake(&ctx)? {
            Ok(stake) => stake,
            Err(refusal) => return Ok(refusal),
        };

        let round = flip_coin(side, stake, &mut StdRng::from_entropy());
        settle(&ctx, round).await
    })
}

pub fn rock_paper_scissors(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        let Some(hand) = ctx.arg(0).and_then(Hand::parse) else {
            return Ok(usage(&ctx, GAMBLING));
        };
        let stake = match stake(&ctx)? {
            Ok(stake) => stake,
            Err(refusal) => return Ok(refusal),
        };

        let round = play_rps(hand, stake, &mut StdRng::from_entropy());
        settle(&ctx, round).await
    })
}
