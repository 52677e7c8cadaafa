// Discord commands for the economy system
//
// Same pattern as the other command files:
// 1. Parse the positional arguments
// 2. Call the core service
// 3. Format the response

use crate::core::commands::arguments;
use crate::core::dispatch::{BoxFuture, Error, Reply};
use crate::core::economy::{parse_currency_amount, AmountError, BetError};
use crate::discord::data::Context;
use crate::discord::responses::{mention, respond, usage, ECONOMY};

/// Send part of your balance to another member.
pub fn transfer(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        let Ok(recipient) = arguments::user_id(ctx.arg(0)) else {
            return Ok(usage(&ctx, ECONOMY));
        };
        let sender = ctx.profile()?;

        let amount = match parse_currency_amount(sender.balance, ctx.arg(1)) {
            Ok(amount) => amount,
            Err(AmountError::Missing) => return Ok(usage(&ctx, ECONOMY)),
            Err(AmountError::Invalid(_)) => {
                return Ok(respond(&ctx, "Transfer", ECONOMY, "Invalid amount"))
            }
        };

        let amount = match ctx.data.economy.check_transfer(sender, amount) {
            Ok(amount) => amount,
            Err(BetError::Invalid) => {
                return Ok(respond(&ctx, "Transfer", ECONOMY, "Invalid amount"))
            }
            Err(BetError::Insufficient { .. }) => {
                return Ok(respond(
                    &ctx,
                    "Transfer",
                    ECONOMY,
                    "You have insufficient funds",
                ))
            }
        };

        ctx.data
            .economy
            .transfer(sender.id, recipient, amount)
            .await?;

        Ok(respond(
            &ctx,
            "Transfer",
            ECONOMY,
            format!(
                "Successfully transferred :dollar: {} to {}",
                amount,
                mention(recipient)
            ),
        ))
    })
}
