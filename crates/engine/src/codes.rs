use catalog::ClimateLayerId;
use foundation::ids::PropertyId;

/// One event on the host<->engine integer channel.
///
/// The channel multiplexes overlay control and marker clicks over a single
/// integer: `0` clears everything, `1..=4` select a climate layer, and any
/// other positive value is a clicked property id. Consequently property ids
/// `1..=4` cannot travel on this channel; hosts allocate ids above 4.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Interaction {
    Clear,
    Layer(ClimateLayerId),
    Property(PropertyId),
}

impl Interaction {
    pub fn decode(code: u32) -> Self {
        match code {
            0 => Interaction::Clear,
            1 => Interaction::Layer(ClimateLayerId::Lst),
            2 => Interaction::Layer(ClimateLayerId::Ndvi),
            3 => Interaction::Layer(ClimateLayerId::Uhi),
            4 => Interaction::Layer(ClimateLayerId::Utfvi),
            other => Interaction::Property(PropertyId(other)),
        }
    }

    pub fn encode(self) -> u32 {
        match self {
            Interaction::Clear => 0,
            Interaction::Layer(ClimateLayerId::Lst) => 1,
            Interaction::Layer(ClimateLayerId::Ndvi) => 2,
            Interaction::Layer(ClimateLayerId::Uhi) => 3,
            Interaction::Layer(ClimateLayerId::Utfvi) => 4,
            Interaction::Property(id) => id.0,
        }
    }
}
