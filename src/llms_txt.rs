// LLM-friendly documentation endpoint content.

pub const LLMS_TXT: &str = r#"# FitZone Backend API
> Backend for a territory-capture fitness game: an AI chat coach and a zone picker that ranks map zones for the player's next session.

## Authentication
None. CORS is open unless CORS_ALLOWED_ORIGINS is set.

## Errors
Non-2xx responses carry a JSON body: {"detail": "<message>"}.
- 400 - malformed body, empty zone list, out-of-range coordinates
- 500 - GEMINI_API_KEY not set, or the language model failed

## Endpoints
- GET /health - Liveness check, returns {"status": "ok"}
- GET /metrics - Prometheus metrics (text format)
- POST /ai-coach - Chat with the coach
  Body: {"messages": [{"role": "user"|"assistant"|"system", "content": "..."}],
         "context": {"name", "fitnessLevel", "fitnessGoals", "totalDistance", "totalActivities",
                     "xp", "level", "streak", "zonesOwned", "currentLocation"?: {"lat","lng"},
                     "timeOfDay": "morning"|"afternoon"|"evening"|"night", "nearbyPlaces"?: [...]}}
  Returns: {"message", "suggestions"?, "recommendedPlace"?}
- POST /zone-decision - Pick the best zone to target next
  Body: {"zones": [{"id", "center": {"lat","lng"}, "isOwned"?, "level"?, "name"?, "type"?}],
         "context": {"currentLocation": {"lat","lng"}, "streak"?, "level"?, "timeOfDay"?}}
  Returns: {"zoneId", "score", "reason", "model", "distanceKm", "estimatedRouteKm",
            "estimatedTravelMinutes", "idealPath"}

## Zone scoring
score = 0.34*proximity + 0.24*distanceFit + 0.20*quality + 0.14*ownership + 0.08*levelFit + streakBonus
Unowned zones are preferred. The first zone wins ties.
Zone types: park, trail, greenway, runway, waterfront, gym.
"#;
