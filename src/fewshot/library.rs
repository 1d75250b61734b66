//! The worked examples embedded in every prompt.
//!
//! Each example pairs a request description with the exact JSON document we
//! want back. Companions, lodging and activities differ between examples.

/// Version tag of the example set; bump when any example changes
pub const LIBRARY_VERSION: &str = "2024.08-1";

/// A worked request/response pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    pub prompt_text: &'static str,
    /// A complete itinerary JSON document
    pub response_text: &'static str,
}

static EXAMPLES: [Example; 4] = [
    Example {
        prompt_text: "This trip is to Yosemite National Park between 2024-05-23 and 2024-05-25. This person will be traveling with family and kids and would like to stay in hotels. They want to do the following activities: hiking, sightseeing. Create a daily itinerary for this trip using this information.",
        response_text: r#"{
  "trip_name": "Yosemite Family Getaway",
  "location": "Yosemite National Park",
  "trip_start": "2024-05-23",
  "trip_end": "2024-05-25",
  "num_days": 3,
  "travel_companions": "family with kids",
  "lodging": "hotels",
  "activities": "hiking, sightseeing",
  "itinerary": [
    {
      "day": 1,
      "date": "2024-05-23",
      "morning": "Check in at Yosemite Valley Lodge and walk the short loop to Lower Yosemite Fall.",
      "afternoon": "Picnic lunch in Cook's Meadow, then ride the valley floor shuttle to Valley View.",
      "evening": "Watch sunset light on El Capitan from the Merced River beach, dinner at the lodge food court."
    },
    {
      "day": 2,
      "date": "2024-05-24",
      "morning": "Hike the Mist Trail to the Vernal Fall footbridge, an easy turnaround point for kids.",
      "afternoon": "Visit the Yosemite Museum and the Junior Ranger program at the Valley Visitor Center.",
      "evening": "Ranger-led campfire talk at Lower Pines amphitheater."
    },
    {
      "day": 3,
      "date": "2024-05-25",
      "morning": "Drive up to Glacier Point for the view over Half Dome.",
      "afternoon": "Walk among the giant sequoias of the Mariposa Grove.",
      "evening": "Check out and drive home, stopping for dinner in Oakhurst."
    }
  ]
}"#,
    },
    Example {
        prompt_text: "This trip is to Acadia National Park between 2024-09-10 and 2024-09-11. This person will be traveling solo and would like to stay in campsites. They want to do the following activities: kayaking, biking, photography. Create a daily itinerary for this trip using this information.",
        response_text: r#"{
  "trip_name": "Acadia Solo Coast Trip",
  "location": "Acadia National Park",
  "trip_start": "2024-09-10",
  "trip_end": "2024-09-11",
  "num_days": 2,
  "travel_companions": "solo",
  "lodging": "campsites",
  "activities": "kayaking, biking, photography",
  "itinerary": [
    {
      "day": 1,
      "date": "2024-09-10",
      "morning": "Set up camp at Blackwoods Campground and bike the carriage road loop around Eagle Lake.",
      "afternoon": "Guided sea kayak tour out of Bar Harbor around the Porcupine Islands.",
      "evening": "Photograph sunset from the summit of Cadillac Mountain."
    },
    {
      "day": 2,
      "date": "2024-09-11",
      "morning": "Sunrise photography at Otter Cliff, then breakfast back at camp.",
      "afternoon": "Bike the Park Loop Road to Jordan Pond for popovers.",
      "evening": "Break camp and head out."
    }
  ]
}"#,
    },
    Example {
        prompt_text: "This trip is to Grand Teton National Park between 2024-07-04 and 2024-07-07. This person will be traveling with friends and would like to stay in cabins. They want to do the following activities: wildlife watching, hiking, white-water rafting. Create a daily itinerary for this trip using this information.",
        response_text: r#"{
  "trip_name": "Teton Friends Adventure",
  "location": "Grand Teton National Park",
  "trip_start": "2024-07-04",
  "trip_end": "2024-07-07",
  "num_days": 4,
  "travel_companions": "friends",
  "lodging": "cabins",
  "activities": "wildlife watching, hiking, white-water rafting",
  "itinerary": [
    {
      "day": 1,
      "date": "2024-07-04",
      "morning": "Arrive in Jackson and check in to the cabins at Colter Bay Village.",
      "afternoon": "Easy hike along the Lakeshore Trail on Jackson Lake.",
      "evening": "Fourth of July fireworks viewed from the Colter Bay marina."
    },
    {
      "day": 2,
      "date": "2024-07-05",
      "morning": "Dawn wildlife drive through Oxbow Bend and Willow Flats looking for moose and elk.",
      "afternoon": "Hike to Inspiration Point via the Jenny Lake boat shuttle.",
      "evening": "Cookout at the cabins."
    },
    {
      "day": 3,
      "date": "2024-07-06",
      "morning": "Half-day white-water rafting trip on the Snake River canyon.",
      "afternoon": "Lunch and browsing in Jackson town square.",
      "evening": "Dusk wildlife watching at Mormon Row for bison and pronghorn."
    },
    {
      "day": 4,
      "date": "2024-07-07",
      "morning": "Sunrise at Schwabacher Landing.",
      "afternoon": "Check out of the cabins and drive to Jackson Hole Airport.",
      "evening": "Travel home."
    }
  ]
}"#,
    },
    Example {
        prompt_text: "This trip is to Joshua Tree National Park between 2024-03-15 and 2024-03-16. This person will be traveling with a partner and would like to stay in an RV. They want to do the following activities: rock climbing, stargazing. Create a daily itinerary for this trip using this information.",
        response_text: r#"{
  "trip_name": "Joshua Tree Desert Weekend",
  "location": "Joshua Tree National Park",
  "trip_start": "2024-03-15",
  "trip_end": "2024-03-16",
  "num_days": 2,
  "travel_companions": "partner",
  "lodging": "RV",
  "activities": "rock climbing, stargazing",
  "itinerary": [
    {
      "day": 1,
      "date": "2024-03-15",
      "morning": "Park the RV at Jumbo Rocks Campground and walk the Skull Rock nature trail.",
      "afternoon": "Beginner climbing session at Hidden Valley with a local guide.",
      "evening": "Stargazing from the campground; the park is a certified dark sky area."
    },
    {
      "day": 2,
      "date": "2024-03-16",
      "morning": "Hike to Arch Rock and the Cholla Cactus Garden.",
      "afternoon": "Drive to Keys View for a look across the Coachella Valley.",
      "evening": "Dinner in Twentynine Palms before heading home."
    }
  ]
}"#,
    },
];

/// The example set, in prompt order.
///
/// Deterministic and side-effect-free; every call returns the same slice.
pub fn get_examples() -> &'static [Example] {
    &EXAMPLES
}

/// Escape template-opening sequences so `text` renders literally.
///
/// Every `{{` becomes `\{{`. A run of backslashes right before `{{` would turn
/// that escape back into a live expression, so the run is doubled up by one
/// (Handlebars drops the first backslash of a run) and cut off from the braces
/// with an empty `{{!}}` comment.
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 16);
    let mut rest = text;

    while let Some(pos) = rest.find("{{") {
        let before = &rest[..pos];
        let plain = before.trim_end_matches('\\');
        let run = before.len() - plain.len();

        escaped.push_str(plain);
        if run > 0 {
            escaped.push_str(&"\\".repeat(run + 1));
            escaped.push_str("{{!}}");
        }
        escaped.push_str("\\{{");
        rest = &rest[pos + 2..];
    }

    escaped.push_str(rest);
    escaped
}
