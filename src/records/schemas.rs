use super::{Field, FieldSource, PageKind, Schema};

pub static MATCH: Schema = Schema {
    kind: PageKind::Match,
    file_stem: "match_data",
    fields: &[
        Field::new("Match ID", FieldSource::PathSegment),
        Field::new("Team1", FieldSource::Nth(".team-name", 0)),
        Field::new("Team2", FieldSource::Nth(".team-name", 1)),
        Field::new("Toss Winner", FieldSource::Text(".toss-winner")),
        Field::new("Toss Decision", FieldSource::Text(".toss-decision")),
        Field::new("Pitch Type", FieldSource::Text(".pitch-type")),
        Field::new("Weather", FieldSource::Text(".weather")),
        Field::new("Match Type", FieldSource::Text(".match-type")),
        Field::new("Outcome", FieldSource::Text(".match-outcome")),
    ],
};

pub static TEAM: Schema = Schema {
    kind: PageKind::Team,
    file_stem: "team_data",
    fields: &[
        Field::new("Team Name", FieldSource::Text(".team-name")),
        Field::new("Win Rate", FieldSource::Text(".win-rate")),
        Field::new("Loss Rate", FieldSource::Text(".loss-rate")),
        Field::new("Partnerships", FieldSource::Text(".partnerships")),
        Field::new("Historical Performance", FieldSource::Text(".historical-performance")),
    ],
};

pub static PLAYER: Schema = Schema {
    kind: PageKind::Player,
    file_stem: "player_data",
    fields: &[
        Field::new("Player Name", FieldSource::Text(".player-name")),
        Field::new("Team Name", FieldSource::Text(".team-name")),
        Field::new("Performance Metrics", FieldSource::Text(".performance-metrics")),
        Field::new("Player Form", FieldSource::Text(".player-form")),
        Field::new("Age", FieldSource::Text(".age")),
        Field::new("Specialization", FieldSource::Text(".specialization")),
    ],
};

pub static ALL: [&Schema; 3] = [&MATCH, &TEAM, &PLAYER];
