use crate::config::Config;
use crate::gateway::TickerGateway;

pub struct AppState {
    pub gateway: TickerGateway,
    pub config: Config,
}
