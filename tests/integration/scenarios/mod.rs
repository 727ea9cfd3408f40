mod subscriptions_flow;
mod votes_flow;
